use serde::{Deserialize, Serialize};

/// A candidate accepted by intake and persisted by the record store.
///
/// Field order matches the persisted JSON layout. Legacy Spanish field names are accepted on
/// input so existing candidate files load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "correo")]
    pub email: String,
    #[serde(alias = "institucion")]
    pub institution: String,
    #[serde(alias = "carrera")]
    pub program: String,
    #[serde(alias = "promedio")]
    pub average: f64,
    #[serde(
        alias = "habilidades",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub skills: Option<Vec<String>>,
}

impl CandidateRecord {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        institution: impl Into<String>,
        program: impl Into<String>,
        average: f64,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            institution: institution.into(),
            program: program.into(),
            average,
            skills: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }
}

/// Raw intake payload. Every field is optional so the intake guard can report all problems
/// in a single pass instead of failing on the first missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSubmission {
    #[serde(alias = "nombre", default)]
    pub name: Option<String>,
    #[serde(alias = "correo", default)]
    pub email: Option<String>,
    #[serde(alias = "institucion", default)]
    pub institution: Option<String>,
    #[serde(alias = "carrera", default)]
    pub program: Option<String>,
    #[serde(alias = "promedio", default)]
    pub average: Option<serde_json::Value>,
    #[serde(alias = "habilidades", default)]
    pub skills: Option<Vec<String>>,
}

impl From<CandidateRecord> for CandidateSubmission {
    fn from(record: CandidateRecord) -> Self {
        Self {
            name: Some(record.name),
            email: Some(record.email),
            institution: Some(record.institution),
            program: Some(record.program),
            average: serde_json::Number::from_f64(record.average).map(serde_json::Value::Number),
            skills: record.skills,
        }
    }
}
