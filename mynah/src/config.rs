//! Model resolution and ONNX session configuration.
//!
//! Args structs (for CLI parsing) convert into resolved configs via TryFrom;
//! this module owns the model-source plumbing shared by subcommands.

use clap::ValueEnum;
use eyre::Result;
use hf_hub::Cache;
use hf_hub::api::sync::Api;
use mynah_asr::repo::ModelRepo;
#[allow(unused_imports)]
use ort::execution_providers::*;
use ort::session::Session;
use ort::session::builder::SessionBuilder;
use std::path::PathBuf;

/// Where model files are looked up.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModelSource {
    /// Local directory if it exists, otherwise the Hugging Face Hub
    Auto,
    /// Local directory only
    Path,
    /// Hugging Face cache only (no network)
    Cache,
    /// Hugging Face Hub API
    Api,
}

/// CLI arguments selecting the model.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Model identifier: local directory or Hugging Face repo id
    #[arg(long)]
    pub model_id: String,

    /// Where to look for model files
    #[arg(long, value_enum, default_value_t = ModelSource::Auto)]
    pub model_source: ModelSource,
}

/// Resolved model configuration.
#[derive(Debug)]
pub struct ModelConfig {
    pub model_id: String,
    pub repo: ModelRepo,
}

impl TryFrom<ModelArgs> for ModelConfig {
    type Error = eyre::Error;

    fn try_from(args: ModelArgs) -> Result<Self> {
        let repo = match args.model_source {
            ModelSource::Auto => {
                let path = PathBuf::from(&args.model_id);
                if path.is_dir() {
                    ModelRepo::Path(path)
                } else {
                    let api = Api::new()?;
                    ModelRepo::Api(api.model(args.model_id.clone()))
                }
            }
            ModelSource::Path => ModelRepo::Path(PathBuf::from(&args.model_id)),
            ModelSource::Cache => ModelRepo::Cache(Cache::from_env().model(args.model_id.clone())),
            ModelSource::Api => ModelRepo::Api(Api::new()?.model(args.model_id.clone())),
        };

        Ok(Self {
            model_id: args.model_id,
            repo,
        })
    }
}

/// Build an ONNX session builder with execution providers selected by Cargo
/// features, in priority order. CPU is always available as fallback.
///
/// Enabled via Cargo features: `cuda`, `tensorrt`, `openvino`, `directml`,
/// `coreml`. Ensure the matching drivers and runtime libraries are
/// installed for the desired provider.
pub fn session_builder() -> Result<SessionBuilder> {
    #[allow(unused_mut)]
    let mut providers: Vec<ExecutionProviderDispatch> = Vec::new();

    #[cfg(feature = "cuda")]
    providers.push(CUDAExecutionProvider::default().build());
    #[cfg(feature = "tensorrt")]
    providers.push(TensorRTExecutionProvider::default().build());
    #[cfg(feature = "openvino")]
    providers.push(
        OpenVINOExecutionProvider::default()
            .with_device_type("HETERO:GPU,CPU")
            .build(),
    );
    #[cfg(feature = "directml")]
    providers.push(DirectMLExecutionProvider::default().build());
    #[cfg(feature = "coreml")]
    providers.push(CoreMLExecutionProvider::default().build());

    let builder = Session::builder()?.with_execution_providers(providers)?;

    Ok(builder)
}
