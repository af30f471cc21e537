//! JSON output types for `--json`.
//!
//! Every subcommand prints one envelope: `ok`, the command name and input,
//! then either `result` or `error`.

use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct OutputJson {
    pub ok: bool,
    pub command: &'static str,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub harmonics: Vec<HarmonicJson>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StepJson {
    pub rule: String,
    pub description: String,
    pub after: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct HarmonicJson {
    pub index: u32,
    pub cos_coeff: String,
    pub sin_coeff: String,
}

impl OutputJson {
    pub fn success(
        command: &'static str,
        input: impl Into<String>,
        result: String,
        steps: Vec<StepJson>,
        harmonics: Vec<HarmonicJson>,
    ) -> Self {
        Self {
            ok: true,
            command,
            input: input.into(),
            result: Some(result),
            error: None,
            steps,
            harmonics,
        }
    }

    pub fn failure(command: &'static str, input: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            command,
            input: input.into(),
            result: None,
            error: Some(error.into()),
            steps: Vec::new(),
            harmonics: Vec::new(),
        }
    }
}
