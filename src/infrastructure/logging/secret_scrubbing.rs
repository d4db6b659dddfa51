use regex::{Captures, Regex};
use std::fmt;
use std::io::{self, Write};
use std::sync::LazyLock;
use tracing_subscriber::fmt::MakeWriter;

static SHARED: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Redacts credentials from formatted log lines and diagnostic output
#[derive(Clone)]
pub struct SecretScrubber {
    bearer_pattern: Regex,
    token_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        Self {
            // Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_.~+/=]+").expect("bearer pattern"),
            // access_token / refresh_token / token / secret fields, JSON or key=value
            token_pattern: Regex::new(
                r#"(?i)("?(?:access_token|refresh_token|token|secret)"?\s*[:=]\s*)"?[^"\s,;&}]+"?"#,
            )
            .expect("token pattern"),
            password_pattern: Regex::new(r#"(?i)("?password"?\s*[:=]\s*)"?[^"\s,;&}]+"?"#)
                .expect("password pattern"),
        }
    }

    /// Process-wide instance used by the log writers
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let keep_key = |caps: &Captures| format!("{}[REDACTED]", &caps[1]);

        let scrubbed = self
            .bearer_pattern
            .replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self.token_pattern.replace_all(&scrubbed, keep_key);
        self.password_pattern
            .replace_all(&scrubbed, keep_key)
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// `io::Write` adapter that scrubs each chunk before passing it on.
///
/// The fmt layer writes one fully formatted event per `write` call, so a
/// secret is never split across chunks.
#[derive(Debug)]
pub struct ScrubbingWriter<W> {
    inner: W,
}

impl<W: Write> ScrubbingWriter<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ScrubbingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let scrubbed = SecretScrubber::shared().scrub_message(&text);
        self.inner.write_all(scrubbed.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Wraps any `MakeWriter` so the writers it hands out scrub secrets
#[derive(Debug, Clone)]
pub struct ScrubbingMakeWriter<M> {
    inner: M,
}

impl<M> ScrubbingMakeWriter<M> {
    pub const fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for ScrubbingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = ScrubbingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        ScrubbingWriter::new(self.inner.make_writer())
    }
}
