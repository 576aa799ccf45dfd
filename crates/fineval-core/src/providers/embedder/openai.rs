use super::Embedder;
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Upper bound the embeddings endpoint accepts for array input.
pub const MAX_INPUTS_PER_REQUEST: usize = 2048;

pub struct OpenAIEmbedder {
    pub model: String,
    api_key: String,
    base_url: String,
    pub client: reqwest::Client,
}

impl OpenAIEmbedder {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_vector(v: &serde_json::Value) -> anyhow::Result<Vec<f32>> {
    v.as_array()
        .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing embedding field"))?
        .iter()
        .map(|x| {
            x.as_f64().map(|f| f as f32).ok_or_else(|| {
                anyhow::anyhow!("OpenAI API response malformed: non-numeric embedding value")
            })
        })
        .collect()
}

impl OpenAIEmbedder {
    async fn request(&self, input: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "input": input,
            "model": self.model,
            "encoding_format": "float"
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenAI embeddings API error (status {}): {}",
                status.as_u16(),
                error_text
            );
        }
        Ok(resp.json().await?)
    }
}

/// Consecutive index ranges of at most `max` items covering `0..len`.
pub fn request_chunks(len: usize, max: usize) -> Vec<std::ops::Range<usize>> {
    let max = max.max(1);
    (0..len)
        .step_by(max)
        .map(|start| start..(start + max).min(len))
        .collect()
}

/// Orders `data[*]` by its `index` field; the API does not promise input order.
pub fn parse_batch(json: &serde_json::Value, expected: usize) -> anyhow::Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing data field"))?;
    if data.len() != expected {
        anyhow::bail!(
            "OpenAI API response malformed: {} embeddings for {} inputs",
            data.len(),
            expected
        );
    }
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for (pos, entry) in data.iter().enumerate() {
        let idx = entry
            .get("index")
            .and_then(|i| i.as_u64())
            .map_or(pos, |i| i as usize);
        let slot = slots.get_mut(idx).ok_or_else(|| {
            anyhow::anyhow!("OpenAI API response malformed: index {} out of range", idx)
        })?;
        let vector = entry.get("embedding").unwrap_or(&serde_json::Value::Null);
        *slot = Some(parse_vector(vector)?);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                anyhow::anyhow!("OpenAI API response malformed: no embedding for input {}", i)
            })
        })
        .collect()
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let json = self.request(json!(text)).await?;
        parse_vector(json.pointer("/data/0/embedding").unwrap_or(&serde_json::Value::Null))
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for range in request_chunks(texts.len(), MAX_INPUTS_PER_REQUEST) {
            let chunk = &texts[range];
            let json = self.request(json!(chunk)).await?;
            out.extend(parse_batch(&json, chunk.len())?);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}
