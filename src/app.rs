//! Application wiring: the directive table and the top-level run flow.

use std::io;

use anyhow::Result;
use tracing::Level;

use crate::cli::{Action, Registry};
use crate::config::{TAG_LENGTH_MAX, TAG_LENGTH_MIN};
use crate::engine;
use crate::options::{CipherOptions, Operation};
use crate::suite::CipherSuite;

/// Installs the log subscriber. Diagnostics go to standard error so they
/// never mix with payload written to standard output.
pub fn init_tracing() {
    let level = if std::env::var_os("AESCAT_VERBOSE").is_some() { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();
}

/// Builds the full directive table: one selector per cipher suite, the
/// operand-taking directives, then the single-letter aliases.
fn build_registry() -> Registry {
    let mut registry = Registry::new();
    for suite in CipherSuite::ALL {
        registry = registry.add(&suite.token(), None, &suite.description(), Action::Select(suite));
    }
    registry
        .add("-encrypt", Some("PATH"), "encrypts file\n(a hyphen represents the standard input)", Action::Input(Operation::Encrypt))
        .add("-decrypt", Some("PATH"), "decrypts file\n(a hyphen represents the standard input)", Action::Input(Operation::Decrypt))
        .add("-out", Some("PATH"), "specifies output file\n(a hyphen represents the standard output)", Action::Output)
        .add("-key", Some("HEXSTRING"), "specifies private key", Action::Key)
        .add("-iv", Some("HEXSTRING"), "specifies initial vector", Action::Iv)
        .add("-nonce", Some("HEXSTRING"), "specifies nonce", Action::Nonce)
        .add("-keyphrase", Some("TEXT"), "specifies text phrase to generate private key", Action::KeyPhrase)
        .add("-ivphrase", Some("TEXT"), "specifies text phrase to generate initial vector", Action::IvPhrase)
        .add("-noncephrase", Some("TEXT"), "specifies text phrase to generate nonce", Action::NoncePhrase)
        .add("-tag", Some("NUMBER"), &format!("specifies tag length (min={TAG_LENGTH_MIN} max={TAG_LENGTH_MAX})"), Action::TagLength)
        .add("-aadata", Some("HEXSTRING"), "specifies additional authentication data", Action::AadHex)
        .add("-aatext", Some("TEXT"), "specifies additional authentication text", Action::AadText)
        .add("-overwrite", None, "writes to output file even if it already exists", Action::Overwrite)
        .add("-help", None, "prints this message", Action::Help)
        .alias("-e", "-encrypt")
        .alias("-d", "-decrypt")
        .alias("-o", "-out")
        .alias("-k", "-key")
        .alias("-i", "-iv")
        .alias("-n", "-nonce")
        .alias("-a", "-aadata")
        .alias("-K", "-keyphrase")
        .alias("-I", "-ivphrase")
        .alias("-N", "-noncephrase")
        .alias("-A", "-aatext")
        .alias("-h", "-help")
}

pub struct App {
    registry: Registry,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self { registry: build_registry() }
    }

    /// Processes the argument list and runs the transformation.
    ///
    /// No arguments prints the usage text, as does `-help` anywhere in the
    /// stream; neither is an error.
    pub fn run(&self, args: &[String]) -> Result<()> {
        if args.is_empty() {
            print!("{}", self.registry.help_text());
            return Ok(());
        }
        let mut options = CipherOptions::default();
        if self.registry.process(args, &mut options)? {
            engine::run(&options.resolve()?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_registry_lists_every_suite() {
        let rendered = build_registry().to_string();
        for suite in CipherSuite::ALL {
            assert!(rendered.contains(&suite.token()), "{suite}");
            assert!(rendered.contains(&suite.description()), "{suite}");
        }
    }

    #[test]
    fn test_registry_lists_every_alias() {
        let rendered = build_registry().to_string();
        for (alias, target) in [
            ("-e", "-encrypt"),
            ("-d", "-decrypt"),
            ("-o", "-out"),
            ("-k", "-key"),
            ("-i", "-iv"),
            ("-n", "-nonce"),
            ("-a", "-aadata"),
            ("-K", "-keyphrase"),
            ("-I", "-ivphrase"),
            ("-N", "-noncephrase"),
            ("-A", "-aatext"),
            ("-h", "-help"),
        ] {
            assert!(rendered.contains(&format!("is the alias of {target}")), "{alias}");
        }
    }

    #[test]
    fn test_empty_arguments_is_not_an_error() {
        assert!(App::new().run(&[]).is_ok());
    }

    #[test]
    fn test_unknown_directive_is_reported() {
        let err = App::new().run(&args(&["--frobnicate"])).unwrap_err();
        assert_eq!(err.to_string(), "Bad syntax: --frobnicate");
    }

    #[test]
    fn test_end_to_end_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.dat");
        let sealed = dir.path().join("sealed.dat");
        let opened = dir.path().join("opened.dat");
        std::fs::write(&plain, b"attack at dawn").unwrap();

        App::new()
            .run(&args(&[
                "aes-256-cbc",
                "-K",
                "xyzzy",
                "-I",
                "20241210",
                "-e",
                plain.to_str().unwrap(),
                "-o",
                sealed.to_str().unwrap(),
            ]))
            .unwrap();

        App::new()
            .run(&args(&[
                "aes-256-cbc",
                "-K",
                "xyzzy",
                "-I",
                "20241210",
                "-d",
                sealed.to_str().unwrap(),
                "-o",
                opened.to_str().unwrap(),
            ]))
            .unwrap();

        assert_eq!(std::fs::read(&opened).unwrap(), b"attack at dawn");
    }

    #[test]
    fn test_validation_error_surfaces() {
        let err = App::new().run(&args(&["aes-256-cbc", "-K", "xyzzy"])).unwrap_err();
        assert_eq!(err.to_string(), "Mode(encrypt/decrypt) is not specified.");
    }
}
