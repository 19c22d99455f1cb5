//! Default values for configuration

/// Default table holding chunk rows
pub fn default_table_name() -> String {
    "document_chunks".to_string()
}

/// Default database host
pub fn default_database_host() -> String {
    "localhost".to_string()
}

/// Default database port
pub fn default_database_port() -> u16 {
    5432
}

/// Default database name
pub fn default_database_name() -> String {
    "postgres".to_string()
}

/// Default database user
pub fn default_database_user() -> String {
    "postgres".to_string()
}

/// Default environment variable name for the database password
pub fn default_database_password_env() -> String {
    "DB_PASS".to_string()
}

/// Default OpenAI-compatible API base URL for embeddings
pub fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

/// Default embedding dimension (matches text-embedding-ada-002)
pub fn default_embedding_dimension() -> usize {
    1536
}

/// Default environment variable name for API keys
pub fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default batch size for embedding
pub fn default_embedding_batch_size() -> usize {
    16
}

/// Default number of extra attempts for a failed embedding request
pub fn default_embedding_retries() -> usize {
    0
}

/// Default embedding request timeout in seconds
pub fn default_embedding_timeout() -> u64 {
    60
}

/// Default OpenAI-compatible API base URL for chat completions
pub fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default chat completion model
pub fn default_completion_model() -> String {
    "gpt-4".to_string()
}

/// Default sampling temperature
pub fn default_completion_temperature() -> f32 {
    0.7
}

/// Default system instruction sent with every prompt
pub fn default_completion_system_prompt() -> String {
    "You are an expert assistant.".to_string()
}

/// Default completion request timeout in seconds
pub fn default_completion_timeout() -> u64 {
    120
}

/// Default maximum characters per chunk
pub fn default_chunk_max_chars() -> usize {
    800
}

/// Default overlap characters between chunks
pub fn default_chunk_overlap() -> usize {
    80
}

/// Default number of chunks retrieved per query
pub fn default_query_k() -> usize {
    5
}

/// Maximum number of chunks a query may request
pub fn default_query_max_results() -> usize {
    100
}
