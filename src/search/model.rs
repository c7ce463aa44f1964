use crate::core::config::{Config, DeviceChoice, Pooling};
use crate::core::error::{Error, Result};
use crate::search::provider::{Embedding, EmbeddingProvider};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::sync::Api;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Files a model directory must contain
pub const MODEL_FILES: [&str; 3] = [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE];

/// BERT-family sentence embedding model loaded from a local directory
pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    pooling: Pooling,
}

impl EmbeddingModel {
    /// Load the model named by `config.model_dir`.
    ///
    /// Never touches the network. Any missing file or load failure is
    /// reported as [`Error::ProviderUnavailable`].
    pub fn load(config: &Config) -> Result<Self> {
        let model_dir = &config.model_dir;
        for file in MODEL_FILES {
            if !model_dir.join(file).exists() {
                return Err(Error::ProviderUnavailable(format!(
                    "{} not found in {}. Run `folder2vec fetch-model` first.",
                    file,
                    model_dir.display()
                )));
            }
        }

        let device = select_device(config.device);
        info!(model_dir = %model_dir.display(), device = ?device, "Loading embedding model");

        let config_content = std::fs::read_to_string(model_dir.join(CONFIG_FILE))?;
        let bert_config: BertConfig = serde_json::from_str(&config_content).map_err(|e| {
            Error::ProviderUnavailable(format!("Failed to parse model config: {}", e))
        })?;
        let max_length = max_position_embeddings(&config_content);

        let tokenizer = load_tokenizer(&model_dir.join(TOKENIZER_FILE), max_length)?;

        // Load model weights using memory mapping
        let weights = model_dir.join(WEIGHTS_FILE);
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights], DTYPE, &device).map_err(|e| {
                Error::ProviderUnavailable(format!("Failed to load weights: {}", e))
            })?
        };

        let model = BertModel::load(vb, &bert_config)
            .map_err(|e| Error::ProviderUnavailable(format!("Failed to load model: {}", e)))?;

        info!("Embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            pooling: config.pooling,
        })
    }

    /// Download the model files for `model_id` from the HuggingFace Hub into
    /// `model_dir`.
    pub fn fetch(model_id: &str, model_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(model_dir)?;

        let api = Api::new()?;
        let repo = api.model(model_id.to_string());

        for file in MODEL_FILES {
            info!(model = model_id, file, "Downloading");
            let cached = repo.get(file)?;
            std::fs::copy(&cached, model_dir.join(file))?;
        }

        Ok(())
    }

    /// Run the encoder over a single, unpadded text.
    ///
    /// BertModel::forward takes no attention mask, so padded batches would let
    /// PAD tokens leak into every pooled vector.
    fn encode_one(&self, text: &str) -> Result<Embedding> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Tokenizer(format!("Tokenization failed: {}", e)))?;

        let token_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = token_ids.zeros_like()?;
        debug!(tokens = encoding.len(), "Encoding text");

        // [1, seq, hidden]
        let hidden = self.model.forward(&token_ids, &token_type_ids)?;

        let pooled = match self.pooling {
            Pooling::Cls => hidden.narrow(1, 0, 1)?.squeeze(1)?,
            Pooling::Mean => hidden.mean(1)?,
        };

        let normalized = normalize_l2(&pooled)?;
        Ok(normalized.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl EmbeddingProvider for EmbeddingModel {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts.iter().map(|text| self.encode_one(text)).collect()
    }

    fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.encode_one(text)
    }
}

fn select_device(choice: DeviceChoice) -> Device {
    match choice {
        DeviceChoice::Cpu => Device::Cpu,
        DeviceChoice::Auto => Device::cuda_if_available(0).unwrap_or(Device::Cpu),
    }
}

/// Read `max_position_embeddings` from a BERT config, defaulting to 512
fn max_position_embeddings(config_json: &str) -> usize {
    serde_json::from_str::<serde_json::Value>(config_json)
        .ok()
        .and_then(|value| value.get("max_position_embeddings").and_then(|v| v.as_u64()))
        .map(|n| n as usize)
        .unwrap_or(512)
}

/// Load a tokenizer truncated to the model's position limit, with padding
/// disabled so each text is encoded at its own length
fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| Error::ProviderUnavailable(format!("Failed to load tokenizer: {}", e)))?;

    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::ProviderUnavailable(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// L2 normalization
fn normalize_l2(v: &Tensor) -> Result<Tensor> {
    Ok(v.broadcast_div(&v.sqr()?.sum_keepdim(1)?.sqrt()?)?)
}
