use rig::{agent::Agent, client::CompletionClient, providers::openrouter};

/// Build an OpenRouter-backed agent for `model` with the given system preamble.
pub fn get_llm_agent(api_key: &str, model: &str, preamble: &str) -> Agent<openrouter::CompletionModel> {
    let client = openrouter::Client::new(api_key);
    client.agent(model).preamble(preamble).build()
}
