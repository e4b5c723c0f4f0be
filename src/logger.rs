//! Console and CSV progress reporting for a boosting run.
use colored::Colorize;

use crate::{
    Booster,
    Sample,
    WeakLearner,
    error::Result,
    hypothesis::Ensemble,
};

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::time::Instant;

const DEFAULT_ROUND: usize = 100;
const DEFAULT_TIMELIMIT_MILLIS: u128 = u128::MAX;
const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;
const HEADER: &str = "Round,TrainError,TestError,Time\n";


/// Boosters that can report the combined hypothesis of the rounds run
/// so far.
pub trait CurrentHypothesis {
    /// The combined hypothesis type.
    type Output;

    /// A snapshot of the current combined hypothesis.
    fn current_hypothesis(&self) -> Result<Self::Output>;
}


/// Runs a booster while logging the train/test error and the running
/// time of every round.
///
/// Each round is appended to a CSV file; every `print_every` rounds a
/// line is also printed to the console.
pub struct Logger<'a, B, W> {
    booster: B,
    weak_learner: W,
    train: &'a Sample,
    test: &'a Sample,
    time_limit: u128,
    round: usize,
}


impl<'a, B, W> Logger<'a, B, W>
    where B: Booster<Output = Ensemble> + CurrentHypothesis<Output = Ensemble>,
          W: WeakLearner,
{
    /// Create a new instance of `Logger`.
    pub fn new(booster: B, weak_learner: W, train: &'a Sample, test: &'a Sample)
        -> Self
    {
        Self {
            booster,
            weak_learner,
            train,
            test,
            time_limit: DEFAULT_TIMELIMIT_MILLIS,
            round: DEFAULT_ROUND,
        }
    }


    /// Set the time limit for boosting algorithm as milliseconds.
    /// If the boosting algorithm reaches this limit,
    /// breaks immediately.
    pub fn time_limit_as_millis(mut self, time_limit: u128) -> Self {
        self.time_limit = time_limit;
        self
    }


    /// Set the time limit for boosting algorithm as seconds.
    pub fn time_limit_as_secs(mut self, time_limit: u64) -> Self {
        self.time_limit = (time_limit as u128).saturating_mul(1_000);
        self
    }


    /// Set the interval to print the current status.
    /// By default, the method `run` prints its status every `100` rounds.
    /// If you don't want to print the log,
    /// set `usize::MAX`.
    pub fn print_every(mut self, round: usize) -> Self {
        self.round = round.max(1);
        self
    }


    /// Returns the booster.
    pub fn booster(&self) -> &B {
        &self.booster
    }


    fn print_log_header(&self) {
        println!(
            "      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ROUND".bold().red(),
            "TRAIN".bold().green(),
            "TEST".bold().yellow(),
            "TIME".bold().cyan(),
        );
    }


    fn print_info(info: Option<Vec<(&str, String)>>) {
        let Some(info) = info else { return; };
        let line = info.into_iter()
            .map(|(key, val)| {
                format!(
                    "    + {:<STAT_WIDTH$}\t{:>width$}",
                    key,
                    val.bold().yellow(),
                    width = STAT_WIDTH - 8
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        println!("{line}");
    }


    fn print_stats(&self) {
        let limit = if self.time_limit != u128::MAX {
            time_format(self.time_limit)
        } else {
            "Nothing".into()
        };
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Booster".bold(),
            self.booster.name().bold().green(),
        );
        Self::print_info(self.booster.info());

        println!(
            "+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Weak Learner".bold(),
            self.weak_learner.name().bold().green(),
        );
        Self::print_info(self.weak_learner.info());

        println!(
            "+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n{:=^FULL_WIDTH$}\n",
            "Time Limit".bold(),
            limit.bold().green(),
            "".bold(),
        );
    }


    /// Run the booster, writing one CSV line per round to `filename`.
    pub fn run<P: AsRef<Path>>(&mut self, filename: P) -> Result<Ensemble> {
        let mut file = File::create(filename)?;
        file.write_all(HEADER.as_bytes())?;

        self.booster.preprocess()?;
        if self.round != usize::MAX {
            self.print_stats();
            self.print_log_header();
        }

        let mut time_acc = 0;
        let mut iter = 1;
        loop {
            let now = Instant::now();
            let flow = self.booster.boost(&self.weak_learner, iter)?;
            time_acc += now.elapsed().as_millis();

            let f = self.booster.current_hypothesis()?;
            let train = f.error_rate(self.train)?;
            let test = f.error_rate(self.test)?;
            writeln!(file, "{iter},{train},{test},{time_acc}")?;

            let tle = time_acc > self.time_limit;
            let tag = if self.round == usize::MAX {
                None
            } else if tle {
                Some("[TLE]".bold().bright_red())
            } else if flow.is_break() {
                Some("[FIN]".bold().bright_green())
            } else if iter % self.round == 0 {
                Some("[LOG]".bold().magenta())
            } else {
                None
            };
            if let Some(tag) = tag {
                println!(
                    "{} {}\t{}\t{}\t{}",
                    tag,
                    format!("{:>WIDTH$}", iter).red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).green(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", test).yellow(),
                    time_format(time_acc).bold().cyan(),
                );
            }

            if tle || flow.is_break() {
                break;
            }
            iter += 1;
        }

        self.booster.postprocess()
    }
}


fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{:0>3}s", millisec);
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {:0>2}.{:0>3}s", sec, millisec);
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {:0>2}m {:0>2}s", min, sec);
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {:0>2}h {:0>2}m", hours, min)
}
