//! Survey Schema Module
//! Describes the questionnaire: which CSV columns hold answers, how each
//! question is labeled in the UI, and which chart it prefers.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preferred chart for a question's value counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
}

/// One questionnaire column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier used in code and crosstab wiring.
    pub key: String,
    /// Exact CSV header of the answer column.
    pub column: String,
    /// Short name shown in the filter panel and chart titles.
    pub label: String,
    pub chart: ChartKind,
}

/// The questionnaire layout plus the default dataset location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySchema {
    pub source_url: String,
    pub questions: Vec<Question>,
}

/// Default dataset published by the survey authors.
const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/luanportella/Questionarios/main/raw_data.csv";

fn q(key: &str, column: &str, label: &str, chart: ChartKind) -> Question {
    Question {
        key: key.to_string(),
        column: column.to_string(),
        label: label.to_string(),
        chart,
    }
}

impl Default for SurveySchema {
    fn default() -> Self {
        use ChartKind::{Bar, Pie};

        // Column headers are verbatim from the published questionnaire CSV.
        let questions = vec![
            q("age", "1 - Qual a sua idade?", "Age", Bar),
            q(
                "residence",
                "2 - Reside em Cachoeira do sul ou se mudaria para a cidade:",
                "Lives in Cachoeira do Sul",
                Pie,
            ),
            q(
                "city",
                "3 - Se não reside em Cachoeira do Sul, mora em qual cidade?",
                "City",
                Bar,
            ),
            q("education", "4 - Qual a sua escolaridade:", "Education", Pie),
            q(
                "degree_level",
                "5 - Se possuí formação superior, qual o nível:",
                "Degree level",
                Bar,
            ),
            q(
                "work_area",
                "6 - Se você trabalha, qual a sua área de atuação:",
                "Work area",
                Bar,
            ),
            q(
                "first_time",
                "7 - Seria a sua primeira vez estudando na UFSM-CS:",
                "First time at UFSM-CS",
                Pie,
            ),
            q(
                "current_program",
                "8 - Qual curso está cursando na UFSM-CS?",
                "Current UFSM-CS program",
                Bar,
            ),
            q(
                "start_horizon",
                "9 - Em quanto tempo pretende iniciar uma graduação?",
                "Time to start a degree",
                Bar,
            ),
            q(
                "stem_interest",
                "10 - Teria interesse em cursos da área de Exatas (como Matemática, Física, Química, Engenharia, entre outros)? \
                 Essa área abrange cursos voltados para o raciocínio lógico, cálculo, experimentação e tecnologia, podendo ter foco em pesquisa, \
                 indústria ou ensino (Licenciatura).",
                "STEM interest",
                Pie,
            ),
            q(
                "main_difficulty",
                "11 - Na sua opinião, qual a maior dificuldade para iniciar ou concluir uma graduação:",
                "Main difficulty",
                Bar,
            ),
            q(
                "program_interest",
                "12 - Sobre o curso apresentado (Ciências Exatas e Sustentabilidade Tecnológica), você teria interesse em cursá-lo na UFSM-CS?",
                "Presented program interest",
                Pie,
            ),
            q(
                "interest_level",
                "13 - Qual seu nível de interesse em fazer o curso apresentado?",
                "Interest level",
                Bar,
            ),
            q(
                "shift",
                "14 - Qual turno seria mais adequado para você fazer o curso?",
                "Preferred shift",
                Bar,
            ),
            q(
                "choice_factors",
                "15 - Quais fatores te influenciam na escolha do curso? (marque até 2)",
                "Choice factors",
                Bar,
            ),
            q(
                "work_study",
                "16 - Você estaria disposto a fazer o curso mesmo se precisasse trabalhar e estudar ao mesmo tempo?",
                "Work and study",
                Pie,
            ),
            q(
                "software_eng_interest",
                "17 - Qual é o seu nível de interesse em um curso de Engenharia de Software?",
                "Software Engineering interest",
                Bar,
            ),
            q(
                "other_programs",
                "18 -  Se não tem interesse em nenhum desses cursos, teria interesse em algum outro:",
                "Other programs",
                Bar,
            ),
            q(
                "offered_programs",
                "19 - Em qual dos cursos ofertados pela UFSM-CS você tem interesse?",
                "Offered programs",
                Bar,
            ),
            q(
                "not_offered_programs",
                "20 - Em qual curso,  não ofertado pela UFSM-CS ,  você tem interesse?",
                "Not-offered programs",
                Bar,
            ),
            q(
                "knows_someone",
                "24 - Você conhece alguém que teria interesse em fazer alguns dos cursos apresentados?",
                "Knows someone interested",
                Pie,
            ),
            q("source", "Identificação", "Response source", Bar),
        ];

        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            questions,
        }
    }
}

impl SurveySchema {
    /// Load a questionnaire description from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SchemaError> {
        let file = File::open(path)?;
        let schema = serde_json::from_reader(BufReader::new(file))?;
        Ok(schema)
    }

    /// Look up a question by its stable key.
    pub fn question(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.key == key)
    }

    /// CSV headers of all answer columns, in questionnaire order.
    pub fn columns(&self) -> Vec<&str> {
        self.questions
            .iter()
            .map(|question| question.column.as_str())
            .collect()
    }

    /// Schema columns absent from a loaded DataFrame.
    pub fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        self.questions
            .iter()
            .filter(|question| !present.contains(&question.column.as_str()))
            .map(|question| question.column.clone())
            .collect()
    }
}

/// Short display label for a Likert interest-level answer.
/// Unmapped values pass through unchanged.
pub fn interest_level_label(value: &str) -> &str {
    match value {
        "1 – Não tenho interesse" => "None",
        "2 – Tenho pouco interesse" => "Low",
        "3 – Interesse moderado" => "Moderate",
        "4 – Tenho interesse" => "High",
        "5 – Tenho muito interesse" => "Very high",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_has_all_questions() {
        let schema = SurveySchema::default();
        assert_eq!(schema.questions.len(), 22);
        assert!(schema.question("age").is_some());
        assert!(schema.question("source").is_some());
        assert!(schema.question("nonexistent").is_none());
    }

    #[test]
    fn question_keys_are_unique() {
        let schema = SurveySchema::default();
        let mut keys: Vec<&str> = schema.questions.iter().map(|q| q.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), schema.questions.len());
    }

    #[test]
    fn missing_columns_reports_absent_headers() {
        let schema = SurveySchema::default();
        let df = DataFrame::new(vec![Column::new(
            "1 - Qual a sua idade?".into(),
            vec!["18-24"],
        )])
        .unwrap();

        let missing = schema.missing_columns(&df);
        assert_eq!(missing.len(), 21);
        assert!(!missing.contains(&"1 - Qual a sua idade?".to_string()));
    }

    #[test]
    fn interest_labels_map_likert_values() {
        assert_eq!(interest_level_label("1 – Não tenho interesse"), "None");
        assert_eq!(interest_level_label("5 – Tenho muito interesse"), "Very high");
        assert_eq!(interest_level_label("something else"), "something else");
    }

    #[test]
    fn schema_round_trips_through_json() {
        let schema = SurveySchema::default();
        let json = serde_json::to_string(&schema).unwrap();
        let back: SurveySchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.questions.len(), schema.questions.len());
        assert_eq!(back.source_url, schema.source_url);
    }
}
