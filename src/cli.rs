use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::semantic::DEFAULT_MODEL_ID;

#[derive(Parser, Debug)]
#[command(
    name = "medrag",
    version,
    about = "Local medical knowledge retrieval and symptom-based disease ranking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the knowledge index from the reference artifact.
    BuildIndex(BuildIndexArgs),
    /// Retrieve knowledge documents for a free-text query.
    Query(QueryArgs),
    /// Rank diseases for a list of symptoms.
    Predict(PredictArgs),
    /// List the symptom catalog or search it by substring.
    Symptoms(SymptomsArgs),
    Disease(DiseaseArgs),
    Importance(ImportanceArgs),
    /// Route a chat message through intent detection, prediction and retrieval.
    Chat(ChatArgs),
    Status(StatusArgs),
}

/// Artifact locations shared by every command.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[arg(long, default_value = ".cache/medrag")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub reference_path: Option<PathBuf>,

    #[arg(long)]
    pub model_path: Option<PathBuf>,

    #[arg(long)]
    pub index_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub embedding_model_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct BuildIndexArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long)]
    pub query: String,

    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    #[arg(long)]
    pub min_score: Option<f64>,

    /// Print the numbered context block instead of the result list.
    #[arg(long, default_value_t = false)]
    pub context: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long = "symptom", required = true)]
    pub symptoms: Vec<String>,

    #[arg(long, default_value_t = 3)]
    pub top_n: usize,

    /// Drop predictions below this confidence percentage.
    #[arg(long, default_value_t = 1.0)]
    pub min_confidence: f64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SymptomsArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long)]
    pub search: Option<String>,

    /// Print the severity weight of one symptom.
    #[arg(long, conflicts_with = "search")]
    pub severity: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiseaseArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportanceArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long)]
    pub message: String,

    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    #[arg(long, default_value_t = 3)]
    pub top_n: usize,

    #[arg(long)]
    pub min_score: Option<f64>,

    #[arg(long)]
    pub min_confidence: Option<f64>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_cutoff_defaults_to_predict_only() {
        let cli = Cli::try_parse_from(["medrag", "chat", "--message", "itching, chills"])
            .expect("parse chat");
        let Commands::Chat(chat) = cli.command else {
            panic!("expected chat command");
        };
        assert_eq!(chat.min_confidence, None);
        assert_eq!(chat.top_n, 3);

        let cli = Cli::try_parse_from(["medrag", "predict", "--symptom", "itching"])
            .expect("parse predict");
        let Commands::Predict(predict) = cli.command else {
            panic!("expected predict command");
        };
        assert_eq!(predict.min_confidence, 1.0);
        assert_eq!(predict.symptoms, vec!["itching"]);
    }
}
