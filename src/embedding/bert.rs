use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

/// Loads the BERT trunk whatever prefix the checkpoint was exported with.
pub(crate) fn load_bert_trunk(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

/// Reads `config.json` and memory-maps `model.safetensors` from a model directory.
pub(crate) fn open_bert_checkpoint<'a>(
    model_dir: &Path,
    device: &Device,
) -> Result<(Config, VarBuilder<'a>)> {
    let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
    let config: Config = serde_json::from_str(&config_content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;

    let weights_path = model_dir.join("model.safetensors");
    // SAFETY: the weights file is opened read-only and outlives the VarBuilder.
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

    Ok((config, vb))
}

struct CrossEncoderHead {
    bert: BertModel,
    classifier: Linear,
}

/// BERT with a single-logit classification head (ms-marco style cross-encoder).
#[derive(Clone)]
pub struct CrossEncoderModel(Arc<CrossEncoderHead>);

impl CrossEncoderModel {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let (config, vb) = open_bert_checkpoint(model_dir.as_ref(), device)?;

        let bert = load_bert_trunk(&vb, &config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self(Arc::new(CrossEncoderHead { bert, classifier })))
    }

    /// Returns the relevance logit, shape `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .0
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.0.classifier.forward(&cls_token)
    }
}
