use kdam::{tqdm, Bar, BarExt};
use tracing::info;

use crate::action_selection::Mode;
use crate::env::Environment;
use crate::error::Result;
use crate::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub epochs: usize,
    /// Steps after which an epoch is cut short if the environment has not
    /// reached a terminal state.
    pub max_steps: usize,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            max_steps: 100,
            progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub reached_goal: bool,
    /// Exploration rate in effect during the epoch; zero for test epochs,
    /// which always act greedily.
    pub epsilon: f64,
}

/// Drives an agent through batches of epochs.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn train<E: Environment>(
        &self,
        agent: &mut Agent<E>,
        env: &mut E,
    ) -> Result<Vec<EpochReport>> {
        agent.set_mode(Mode::Learning);
        self.run(agent, env, "train")
    }

    pub fn test<E: Environment>(
        &self,
        agent: &mut Agent<E>,
        env: &mut E,
    ) -> Result<Vec<EpochReport>> {
        agent.set_mode(Mode::Testing);
        self.run(agent, env, "test")
    }

    fn run<E: Environment>(
        &self,
        agent: &mut Agent<E>,
        env: &mut E,
        label: &str,
    ) -> Result<Vec<EpochReport>> {
        let mut reports: Vec<EpochReport> = Vec::with_capacity(self.config.epochs);
        let mut pb: Option<Bar> = if self.config.progress {
            let mut pb = tqdm!(total = self.config.epochs);
            pb.set_description(label.to_uppercase());
            pb.refresh()?;
            Some(pb)
        } else {
            None
        };

        for epoch in 0..self.config.epochs {
            let report: EpochReport = self.run_epoch(agent, env, epoch)?;
            info!(
                "{} epoch {}: steps={} reward={:.2} goal={} epsilon={:.4}",
                label,
                epoch,
                report.steps,
                report.total_reward,
                report.reached_goal,
                report.epsilon
            );
            if let Some(pb) = pb.as_mut() {
                pb.set_postfix(format!(
                    "reward={:.2}, steps={}",
                    report.total_reward, report.steps
                ));
                pb.update(1)?;
            }
            reports.push(report);
        }
        Ok(reports)
    }

    fn run_epoch<E: Environment>(
        &self,
        agent: &mut Agent<E>,
        env: &mut E,
        epoch: usize,
    ) -> Result<EpochReport> {
        env.restart();
        agent.reset(env);

        let mut steps: usize = 0;
        let mut total_reward: f64 = 0.0;
        while steps < self.config.max_steps && !env.is_terminal() {
            let (_action, reward) = agent.update(env)?;
            total_reward += reward;
            steps += 1;
        }
        Ok(EpochReport {
            epoch,
            steps,
            total_reward,
            reached_goal: env.is_terminal(),
            epsilon: match agent.mode() {
                Mode::Testing => 0.0,
                _ => agent.epsilon(),
            },
        })
    }
}

/// Share of epochs that ended on a terminal state.
pub fn success_rate(reports: &[EpochReport]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    reports.iter().filter(|r| r.reached_goal).count() as f64 / reports.len() as f64
}
