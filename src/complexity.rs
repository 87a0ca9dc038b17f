//! Deterministic complexity scoring over task structure.
//!
//! The estimate is a pure function of a task snapshot and the configured
//! weights: subtask count, dependency fan-in and fan-out, and a bucketed
//! description length feed a weighted integer score, which the thresholds
//! turn into a category. No clock, no randomness, no external calls.

use crate::store::ProjectState;
use crate::types::{Complexity, ComplexityReport, Task};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Weights and thresholds for the complexity heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityWeights {
    /// Points per subtask.
    #[serde(default = "default_subtask_weight")]
    pub subtask_weight: u32,
    /// Points per dependency of the task itself.
    #[serde(default = "default_fan_in_weight")]
    pub fan_in_weight: u32,
    /// Points per task depending on this one.
    #[serde(default = "default_fan_out_weight")]
    pub fan_out_weight: u32,
    /// Points per description length bucket.
    #[serde(default = "default_description_weight")]
    pub description_weight: u32,
    /// Scores at or above this are at least medium.
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: u32,
    /// Scores at or above this are high.
    #[serde(default = "default_high_threshold")]
    pub high_threshold: u32,
    /// Hour estimate reported per category.
    #[serde(default)]
    pub hours: HoursByCategory,
}

/// Rough hour estimates attached to each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursByCategory {
    #[serde(default = "default_hours_low")]
    pub low: u32,
    #[serde(default = "default_hours_medium")]
    pub medium: u32,
    #[serde(default = "default_hours_high")]
    pub high: u32,
}

fn default_subtask_weight() -> u32 {
    2
}

fn default_fan_in_weight() -> u32 {
    1
}

fn default_fan_out_weight() -> u32 {
    1
}

fn default_description_weight() -> u32 {
    1
}

fn default_medium_threshold() -> u32 {
    3
}

fn default_high_threshold() -> u32 {
    7
}

fn default_hours_low() -> u32 {
    4
}

fn default_hours_medium() -> u32 {
    8
}

fn default_hours_high() -> u32 {
    16
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            subtask_weight: default_subtask_weight(),
            fan_in_weight: default_fan_in_weight(),
            fan_out_weight: default_fan_out_weight(),
            description_weight: default_description_weight(),
            medium_threshold: default_medium_threshold(),
            high_threshold: default_high_threshold(),
            hours: HoursByCategory::default(),
        }
    }
}

impl Default for HoursByCategory {
    fn default() -> Self {
        Self {
            low: default_hours_low(),
            medium: default_hours_medium(),
            high: default_hours_high(),
        }
    }
}

impl ComplexityWeights {
    /// Validate threshold ordering.
    pub fn validate(&self) -> Result<()> {
        if self.medium_threshold >= self.high_threshold {
            return Err(anyhow!(
                "medium_threshold ({}) must be below high_threshold ({})",
                self.medium_threshold,
                self.high_threshold
            ));
        }
        Ok(())
    }

    pub fn hours_for(&self, complexity: Complexity) -> u32 {
        match complexity {
            Complexity::Low => self.hours.low,
            Complexity::Medium => self.hours.medium,
            Complexity::High => self.hours.high,
        }
    }
}

/// Bucket a description length: 0 short, 1 paragraph, 2 long, 3 essay.
pub(crate) fn description_bucket(description: &str) -> u32 {
    match description.chars().count() {
        0..=80 => 0,
        81..=320 => 1,
        321..=1280 => 2,
        _ => 3,
    }
}

fn categorize(score: u32, weights: &ComplexityWeights) -> Complexity {
    if score >= weights.high_threshold {
        Complexity::High
    } else if score >= weights.medium_threshold {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Score one task against the project view it lives in.
pub fn score_task(
    project: &ProjectState,
    task: &Task,
    weights: &ComplexityWeights,
) -> ComplexityReport {
    let subtask_count = task.subtasks.len();
    let fan_in = task.depends_on.len();
    let fan_out = project.dependents_of(&task.id).len();
    let bucket = description_bucket(&task.description);

    let score = subtask_count as u32 * weights.subtask_weight
        + fan_in as u32 * weights.fan_in_weight
        + fan_out as u32 * weights.fan_out_weight
        + bucket * weights.description_weight;
    let complexity = categorize(score, weights);

    ComplexityReport {
        task_id: task.id.clone(),
        subtask_count,
        fan_out,
        fan_in,
        description_bucket: bucket,
        score,
        complexity,
        estimated_hours: weights.hours_for(complexity),
    }
}

/// Category alone, for the cached field on mutation paths.
pub fn categorize_task(
    project: &ProjectState,
    task: &Task,
    weights: &ComplexityWeights,
) -> Complexity {
    score_task(project, task, weights).complexity
}
