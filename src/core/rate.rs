use std::fmt;

use super::state::State;

/// Rewrites the rate into a function of an input condition: a genuine two-way
/// switch between `on_name` and `off_name`, or a one-sided gate.
#[derive(Debug, Clone, PartialEq)]
pub struct RateFunction {
    pub condition: State,
    pub is_switch: bool,
    pub on_name: String,
    pub off_name: String,
}

/// A rate expression: base name plus an optional piecewise branch keyed by an
/// input condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    pub name: String,
    pub function: Option<RateFunction>,
}

impl Rate {
    pub fn new(name: &str) -> Rate {
        Rate {
            name: name.to_string(),
            function: None,
        }
    }

    pub fn update_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn update_function(
        &mut self,
        condition: State,
        is_switch: bool,
        on_name: String,
        off_name: String,
    ) {
        self.function = Some(RateFunction {
            condition,
            is_switch,
            on_name,
            off_name,
        });
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.function {
            None => write!(f, "{}", self.name),
            Some(func) if func.is_switch => write!(
                f,
                "if({},{},{})",
                func.condition, func.on_name, func.off_name
            ),
            Some(func) => write!(f, "if({},{},0)", func.condition, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rate() {
        assert_eq!(Rate::new("k1").to_string(), "k1");
    }

    #[test]
    fn test_switch_function() {
        let mut rate = Rate::new("k1");
        rate.update_function(
            State::input("SIG"),
            true,
            "k1_1".to_string(),
            "k1_2".to_string(),
        );
        assert_eq!(rate.to_string(), "if([SIG],k1_1,k1_2)");
    }

    #[test]
    fn test_one_sided_gate() {
        let mut rate = Rate::new("k1");
        rate.update_function(
            State::input("SIG"),
            false,
            "k1_1".to_string(),
            "k1_2".to_string(),
        );
        assert_eq!(rate.to_string(), "if([SIG],k1,0)");
    }
}
