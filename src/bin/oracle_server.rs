// Run the vulnerable demo service.
//
//     oracle_server [address]
//
// A random key is generated on start-up and a sample ciphertext is logged,
// ready to be handed to `padding_oracle`.
use padding_oracle::{http::server, CbcPaddingOracle};

const DEFAULT_ADDRESS: &str = "127.0.0.1:9000";
const SAMPLE: &[u8] = br#"{"username": "guest", "role": "user", "expires": "2038-01-19"}"#;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let oracle = CbcPaddingOracle::random();
    let sample = oracle.encrypt(SAMPLE);
    let request_handler = server::PaddingOracleRequestHandler::new(oracle);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("listening on http://{}/convert", listener.local_addr()?);
    log::info!("sample ciphertext: {sample}");
    axum::serve(listener, server::router(&request_handler)).await
}
