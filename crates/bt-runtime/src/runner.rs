use std::sync::Arc;

use bt_core::{Blackboard, OwnerContext, Status, TickContext};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CloneError, NodePool, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunnerConfig {
    pub think_every_ticks: u32,
    pub think_offset_ticks: u32,
    /// Derive each agent's offset from its id so decimated agents spread over ticks.
    pub stagger: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            think_every_ticks: 1,
            think_offset_ticks: 0,
            stagger: false,
        }
    }
}

impl RunnerConfig {
    pub fn deterministic(agent: u64, think_every_ticks: u32) -> Self {
        let every = think_every_ticks.max(1);
        let offset = (agent % (every as u64)) as u32;
        Self {
            think_every_ticks: every,
            think_offset_ticks: offset,
            stagger: true,
        }
    }

    pub fn should_think(&self, tick: u64) -> bool {
        let every = self.think_every_ticks.max(1) as u64;
        ((tick + (self.think_offset_ticks as u64)) % every) == 0
    }

    fn for_agent(&self, agent: u64) -> Self {
        if self.stagger {
            Self::deterministic(agent, self.think_every_ticks)
        } else {
            *self
        }
    }
}

/// Outcome counts of one [`TreeRunner::tick`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickSummary {
    pub ticked: usize,
    pub skipped: usize,
    pub running: usize,
    pub success: usize,
    pub failure: usize,
}

impl std::ops::AddAssign for TickSummary {
    fn add_assign(&mut self, other: Self) {
        self.ticked += other.ticked;
        self.skipped += other.skipped;
        self.running += other.running;
        self.success += other.success;
        self.failure += other.failure;
    }
}

struct Agent {
    id: u64,
    config: RunnerConfig,
    tree: Tree,
    blackboard: Blackboard<'static>,
    last_think: Option<u64>,
}

/// Drives many tree instances, one per agent, in ascending agent-id order.
pub struct TreeRunner {
    config: RunnerConfig,
    pool: Arc<NodePool>,
    agents: Vec<Agent>,
}

impl TreeRunner {
    pub fn new(pool: Arc<NodePool>, config: RunnerConfig) -> Self {
        Self {
            config,
            pool,
            agents: Vec::new(),
        }
    }

    pub fn pool(&self) -> &Arc<NodePool> {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    /// Instantiates `prototype` for `agent`. An existing agent with the same id is despawned
    /// first.
    pub fn spawn(
        &mut self,
        agent: u64,
        prototype: &Tree,
        owner: OwnerContext,
    ) -> Result<(), CloneError> {
        let tree = prototype.instantiate(owner, &self.pool)?;
        let entry = Agent {
            id: agent,
            config: self.config.for_agent(agent),
            tree,
            blackboard: Blackboard::new(),
            last_think: None,
        };

        match self.agents.binary_search_by_key(&agent, |a| a.id) {
            Ok(index) => {
                let old = std::mem::replace(&mut self.agents[index], entry);
                self.retire(old);
            }
            Err(index) => self.agents.insert(index, entry),
        }
        Ok(())
    }

    /// Stops the agent's tree and returns its nodes to the pool.
    pub fn despawn(&mut self, agent: u64) -> bool {
        match self.agents.binary_search_by_key(&agent, |a| a.id) {
            Ok(index) => {
                let old = self.agents.remove(index);
                self.retire(old);
                true
            }
            Err(_) => false,
        }
    }

    /// Ticks every agent due to think on `ctx.tick`. A decimated agent sees the time elapsed
    /// since its previous think as its delta.
    pub fn tick(&mut self, ctx: &TickContext) -> TickSummary {
        let mut summary = TickSummary::default();
        for agent in self.agents.iter_mut() {
            if !agent.config.should_think(ctx.tick) {
                summary.skipped += 1;
                continue;
            }
            summary.ticked += 1;
            let steps = agent
                .last_think
                .map_or(1, |last| ctx.tick.saturating_sub(last).max(1));
            agent.last_think = Some(ctx.tick);
            let step = TickContext::new(ctx.tick, ctx.dt_seconds * steps as f32);
            match agent.tree.tick_with(&step, &mut agent.blackboard) {
                Status::Running => summary.running += 1,
                Status::Success => summary.success += 1,
                Status::Failure => summary.failure += 1,
            }
        }
        summary
    }

    /// Aborts every agent's running path.
    pub fn stop_all(&mut self) {
        for agent in self.agents.iter_mut() {
            agent.tree.stop(&mut agent.blackboard);
        }
    }

    pub fn last_status(&self, agent: u64) -> Option<Status> {
        self.find(agent).and_then(|a| a.tree.last_status())
    }

    pub fn tree(&self, agent: u64) -> Option<&Tree> {
        self.find(agent).map(|a| &a.tree)
    }

    pub fn blackboard(&self, agent: u64) -> Option<&Blackboard<'static>> {
        self.find(agent).map(|a| &a.blackboard)
    }

    pub fn blackboard_mut(&mut self, agent: u64) -> Option<&mut Blackboard<'static>> {
        let index = self.agents.binary_search_by_key(&agent, |a| a.id).ok()?;
        Some(&mut self.agents[index].blackboard)
    }

    fn find(&self, agent: u64) -> Option<&Agent> {
        let index = self.agents.binary_search_by_key(&agent, |a| a.id).ok()?;
        Some(&self.agents[index])
    }

    fn retire(&self, mut agent: Agent) {
        agent.tree.stop(&mut agent.blackboard);
        agent.tree.release(&self.pool);
    }
}

impl Drop for TreeRunner {
    fn drop(&mut self) {
        for agent in std::mem::take(&mut self.agents) {
            self.retire(agent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_offsets_spread_agents() {
        let a = RunnerConfig::deterministic(0, 4);
        let b = RunnerConfig::deterministic(1, 4);
        assert!(a.should_think(0));
        assert!(!b.should_think(0));
        assert!(b.should_think(3));
    }

    #[test]
    fn zero_interval_thinks_every_tick() {
        let config = RunnerConfig {
            think_every_ticks: 0,
            ..RunnerConfig::default()
        };
        assert!((0..5).all(|t| config.should_think(t)));
    }
}
