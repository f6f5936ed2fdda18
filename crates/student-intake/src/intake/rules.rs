use super::fields::FieldUpdates;

/// When a mandatory field applies to a section.
pub enum Activation<S> {
    Always,
    When(fn(&S) -> bool),
}

/// Row of a section's mandatory-field table.
pub struct Requirement<S> {
    pub field: &'static str,
    pub activation: Activation<S>,
}

impl<S> Requirement<S> {
    pub const fn always(field: &'static str) -> Self {
        Self {
            field,
            activation: Activation::Always,
        }
    }

    pub const fn when(field: &'static str, predicate: fn(&S) -> bool) -> Self {
        Self {
            field,
            activation: Activation::When(predicate),
        }
    }

    pub fn is_active(&self, section: &S) -> bool {
        match self.activation {
            Activation::Always => true,
            Activation::When(predicate) => predicate(section),
        }
    }
}

/// Every active required field that has no value in `updates`, in table order.
pub fn missing_fields<S>(
    section: &S,
    requirements: &[Requirement<S>],
    updates: &FieldUpdates,
) -> Vec<&'static str> {
    requirements
        .iter()
        .filter(|requirement| requirement.is_active(section))
        .filter(|requirement| updates.is_missing(requirement.field))
        .map(|requirement| requirement.field)
        .collect()
}

pub(crate) fn is_yes(value: &str) -> bool {
    value == "yes"
}
