use serde::Serialize;

/// One entry of a dropdown: stored value and display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

pub const GENDER: &[SelectOption] = &[
    option("male", "Male"),
    option("female", "Female"),
    option("other", "Other"),
];

pub const BLOOD_GROUP: &[SelectOption] = &[
    option("a_pos", "Blood Group A+"),
    option("a_neg", "Blood Group A-"),
    option("b_pos", "Blood Group B+"),
    option("b_neg", "Blood Group B-"),
    option("ab_pos", "Blood Group AB+"),
    option("ab_neg", "Blood Group AB-"),
    option("o_pos", "Blood Group O+"),
    option("o_neg", "Blood Group O-"),
];

pub const RELIGION: &[SelectOption] = &[
    option("hindu", "Hindu"),
    option("muslim", "Muslim"),
    option("christian", "Christian"),
    option("sikh", "Sikh"),
    option("jew", "Jew"),
    option("other", "Other"),
];

pub const COMMUNITY: &[SelectOption] = &[
    option("oc", "OC"),
    option("bc", "BC"),
    option("bc_others", "BC-Others"),
    option("mbc", "MBC"),
    option("sc_arunthathiyar", "SC-Arunthathiyar"),
    option("sc_others", "SC-Others"),
    option("dnc", "DNC (Denotified Communities)"),
    option("st", "ST"),
    option("other", "Other"),
];

pub const MARITAL_STATUS: &[SelectOption] = &[
    option("married", "Married"),
    option("separated", "Separated"),
    option("divorced", "Divorced"),
    option("single_parent", "Single Parent"),
];

pub const YES_NO: &[SelectOption] = &[option("yes", "Yes"), option("no", "No")];

pub const PARENT_PERMISSION: &[SelectOption] = &[
    option("father", "Father"),
    option("mother", "Mother"),
    option("both", "Both"),
];

pub const EMERGENCY_TYPE: &[SelectOption] = &[
    option("primary", "Primary"),
    option("secondary", "Secondary"),
];

pub const FAMILY_RELATION: &[SelectOption] = &[
    option("father", "Father"),
    option("mother", "Mother"),
    option("guardian", "Guardian"),
    option("sibling", "Sibling"),
    option("other", "Other"),
];

pub const PROOF_TYPE: &[SelectOption] = &[
    option("aadhaar", "Aadhaar"),
    option("passport", "Passport"),
];

// Class XI subject groups.
pub const GROUP_A: &[SelectOption] = &[
    option("physics", "Physics"),
    option("accounts", "Accounts"),
    option("history", "History"),
];

pub const GROUP_B: &[SelectOption] = &[
    option("chemistry", "Chemistry"),
    option("economics", "Economics"),
];

pub const GROUP_C: &[SelectOption] = &[
    option("biology", "Biology"),
    option("computer_science", "Computer Science"),
    option("commerce", "Commerce"),
    option("political_science", "Political Science"),
];

pub const GROUP_D: &[SelectOption] = &[
    option("mathematics", "Mathematics"),
    option("environmental_studies", "Environmental Studies"),
    option("fine_arts", "Fine Arts"),
];

/// Option sets rendered by the profile form.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOptions {
    pub gender: &'static [SelectOption],
    pub blood_group: &'static [SelectOption],
    pub religion: &'static [SelectOption],
    pub community: &'static [SelectOption],
    pub marital_status: &'static [SelectOption],
    pub emergency_type: &'static [SelectOption],
    pub family_relation: &'static [SelectOption],
    pub parent_permission: &'static [SelectOption],
    pub proof_type: &'static [SelectOption],
    pub yes_no: &'static [SelectOption],
    pub group_a: &'static [SelectOption],
    pub group_b: &'static [SelectOption],
    pub group_c: &'static [SelectOption],
    pub group_d: &'static [SelectOption],
}

impl SelectionOptions {
    pub const fn standard() -> Self {
        Self {
            gender: GENDER,
            blood_group: BLOOD_GROUP,
            religion: RELIGION,
            community: COMMUNITY,
            marital_status: MARITAL_STATUS,
            emergency_type: EMERGENCY_TYPE,
            family_relation: FAMILY_RELATION,
            parent_permission: PARENT_PERMISSION,
            proof_type: PROOF_TYPE,
            yes_no: YES_NO,
            group_a: GROUP_A,
            group_b: GROUP_B,
            group_c: GROUP_C,
            group_d: GROUP_D,
        }
    }
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self::standard()
    }
}
