/*!
Configuration (§10.3): the knobs the core pipeline and its external
collaborators agree on, threaded explicitly through a compilation rather
than read from global state.

Grounded on `otter_sat::config::ConfigOption<T>`: each bounded numeric
knob carries its `min`/`max` alongside its `value`, so a caller setting
one out of range gets a clear answer rather than silent clamping.
*/

use crate::completion::PredicateCompletionMode;

/// A bounded configuration knob: `value` is expected to stay within
/// `[min, max]`, enforced by [`ConfigOption::set`] rather than by the
/// type system.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub value: T,
}

impl<T: PartialOrd + Copy> ConfigOption<T> {
    pub fn set(&mut self, value: T) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        self.value = value;
        true
    }
}

/// The compilation-wide configuration. One instance per compilation;
/// never stored in global/thread-local state.
#[derive(Clone)]
pub struct Config {
    /// Multiplier above `Σ|soft weights|` used when computing
    /// `weightHard`.
    pub weight_hard_margin: ConfigOption<f64>,

    /// Worker task count for the grounder.
    pub grounder_workers: ConfigOption<usize>,

    /// Which predicate-completion transform `wlearn`/`compile` apply.
    pub pcm: PredicateCompletionMode,

    /// Whether the grounder builds the Max-Margin dependency map.
    pub dependency_map: bool,

    /// Whether a predicate with no explicit CWA/OWA annotation defaults
    /// to CWA (`true`) or OWA (`false`).
    pub cwa_defaults: bool,

    /// The deadline checked by inference's outer loop.
    pub inference_deadline: Option<std::time::Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weight_hard_margin: ConfigOption {
                name: "weight_hard_margin",
                min: 1.0,
                max: f64::MAX,
                value: 1.0,
            },
            grounder_workers: ConfigOption {
                name: "grounder_workers",
                min: 1,
                max: usize::MAX,
                value: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            },
            pcm: PredicateCompletionMode::Standard,
            dependency_map: false,
            cwa_defaults: true,
            inference_deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grounder_workers_is_at_least_one() {
        let config = Config::default();
        assert!(config.grounder_workers.value >= 1);
    }

    #[test]
    fn config_option_rejects_out_of_range_values() {
        let mut opt = ConfigOption { name: "margin", min: 1.0, max: 10.0, value: 1.0 };
        assert!(!opt.set(0.5));
        assert_eq!(opt.value, 1.0);
        assert!(opt.set(5.0));
        assert_eq!(opt.value, 5.0);
    }
}
