//! Command-line directive dispatch.
//!
//! Arguments are scanned token by token. Each token resolves to a directive
//! (exact identity first, then alias), whose action mutates the cipher
//! options and may consume operand tokens through the cursor. The dispatch
//! table is data: every action is a tagged [`Action`] variant rather than a
//! closure, so the registry holds no hidden mutable state.
//!
//! Rendering the registry with `Display` produces the usage block, with the
//! identity/operand column aligned to the widest entry across directives and
//! alias tokens.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use anyhow::{Result, anyhow, bail};

use crate::options::{CipherOptions, Operation};
use crate::suite::CipherSuite;

/// Configuration mutation bound to a directive token.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    /// Selects a cipher suite; no operand.
    Select(CipherSuite),

    /// Sets the operation and consumes the input path operand.
    Input(Operation),

    /// Consumes the output path operand.
    Output,

    Key,
    KeyPhrase,
    Iv,
    IvPhrase,
    Nonce,
    NoncePhrase,
    TagLength,
    AadHex,
    AadText,

    /// Permits clobbering an existing output file; no operand.
    Overwrite,

    /// Prints the usage block and stops scanning.
    Help,
}

struct Directive {
    identity: String,
    operand: Option<&'static str>,
    description: String,
    action: Action,
}

/// Token cursor over the argument stream.
pub struct Cursor<'a> {
    tokens: &'a [String],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [String]) -> Self {
        // Starts one before the first token; the scan loop advances first.
        Self { tokens, index: usize::MAX }
    }

    /// Moves to the next token, reporting whether one exists.
    pub fn advance(&mut self) -> bool {
        self.index = self.index.wrapping_add(1);
        self.index < self.tokens.len()
    }

    /// The token under the cursor.
    pub fn current(&self) -> &str {
        &self.tokens[self.index]
    }

    /// The token under the cursor, parsed as an integer.
    pub fn current_as_integer(&self) -> Result<i64> {
        let token = self.current();
        token.parse().map_err(|_| anyhow!("Not a number: {token}"))
    }

    /// Advances to the operand token, failing with `missing` if the stream
    /// is exhausted.
    fn operand(&mut self, missing: &str) -> Result<&str> {
        if self.advance() {
            Ok(self.current())
        } else {
            bail!("{missing}");
        }
    }
}

/// Directive table plus alias redirects.
#[derive(Default)]
pub struct Registry {
    directives: Vec<Directive>,
    identities: HashMap<String, usize>,
    aliases: Vec<(String, String)>,
    alias_targets: HashMap<String, String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directive. A duplicate identity silently replaces the
    /// earlier registration in place; registration happens once at startup,
    /// so last-wins is acceptable.
    pub fn add(mut self, identity: &str, operand: Option<&'static str>, description: &str, action: Action) -> Self {
        let directive = Directive {
            identity: identity.to_string(),
            operand,
            description: description.to_string(),
            action,
        };
        match self.identities.get(identity) {
            Some(&slot) => self.directives[slot] = directive,
            None => {
                self.identities.insert(identity.to_string(), self.directives.len());
                self.directives.push(directive);
            }
        }
        self
    }

    /// Records an alias redirect. Alias tokens must not collide with
    /// directive identities; resolution checks identities first.
    pub fn alias(mut self, alias: &str, target: &str) -> Self {
        self.aliases.push((alias.to_string(), target.to_string()));
        self.alias_targets.insert(alias.to_string(), target.to_string());
        self
    }

    fn resolve(&self, token: &str) -> Option<&Directive> {
        if let Some(&slot) = self.identities.get(token) {
            return Some(&self.directives[slot]);
        }
        let target = self.alias_targets.get(token)?;
        self.identities.get(target).map(|&slot| &self.directives[slot])
    }

    /// Scans the token stream, applying each directive's action.
    ///
    /// Returns `Ok(false)` when an action stopped the scan early (help),
    /// `Ok(true)` when the stream was exhausted normally.
    pub fn process(&self, tokens: &[String], options: &mut CipherOptions) -> Result<bool> {
        let mut cursor = Cursor::new(tokens);
        while cursor.advance() {
            let token = cursor.current();
            let Some(directive) = self.resolve(token) else {
                bail!("Bad syntax: {token}");
            };
            if !self.apply(directive.action, &mut cursor, options)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn apply(&self, action: Action, cursor: &mut Cursor<'_>, options: &mut CipherOptions) -> Result<bool> {
        match action {
            Action::Select(suite) => options.select_suite(suite)?,
            Action::Input(operation) => {
                let path = cursor.operand("Input file is not specified.")?.to_string();
                options.set_input(operation, &path);
            }
            Action::Output => {
                let path = cursor.operand("Output file is not specified.")?.to_string();
                options.set_output(&path);
            }
            Action::Key => {
                let value = cursor.operand("Private key is not specified.")?.to_string();
                options.set_key_hex(&value)?;
            }
            Action::KeyPhrase => {
                let phrase = cursor.operand("Key phrase is not specified.")?.to_string();
                options.set_key_phrase(&phrase)?;
            }
            Action::Iv => {
                let value = cursor.operand("Initial vector is not specified.")?.to_string();
                options.set_iv_hex(&value)?;
            }
            Action::IvPhrase => {
                let phrase = cursor.operand("IV phrase is not specified.")?.to_string();
                options.set_iv_phrase(&phrase)?;
            }
            Action::Nonce => {
                let value = cursor.operand("Nonce is not specified.")?.to_string();
                options.set_nonce_hex(&value)?;
            }
            Action::NoncePhrase => {
                let phrase = cursor.operand("Nonce phrase is not specified.")?.to_string();
                options.set_nonce_phrase(&phrase)?;
            }
            Action::TagLength => {
                cursor.operand("Tag length is not specified.")?;
                options.set_tag_length(cursor.current_as_integer()?)?;
            }
            Action::AadHex => {
                let value = cursor.operand("Additional authentication data value is not specified.")?.to_string();
                options.set_aad_hex(&value)?;
            }
            Action::AadText => {
                let text = cursor.operand("Additional authentication text is not specified.")?.to_string();
                options.set_aad_text(&text)?;
            }
            Action::Overwrite => options.allow_overwrite(),
            Action::Help => {
                print!("{}", self.help_text());
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The version banner followed by the usage block.
    #[must_use]
    pub fn help_text(&self) -> String {
        format!("{} version {}\n{self}", crate::config::APP_NAME, env!("CARGO_PKG_VERSION"))
    }

    fn column_width(&self) -> usize {
        let directives = self.directives.iter().map(|d| d.identity.len() + 1 + d.operand.unwrap_or("").len());
        let aliases = self.aliases.iter().map(|(alias, _)| alias.len());
        directives.chain(aliases).max().unwrap_or(0)
    }
}

impl Display for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.column_width();
        let continuation = format!("\n{}", " ".repeat(width + 4));

        writeln!(f, "Syntax:")?;
        writeln!(f, "  {} parameters", crate::config::APP_NAME)?;
        writeln!(f, "Parameters:")?;
        for directive in &self.directives {
            let left = format!("{} {}", directive.identity, directive.operand.unwrap_or(""));
            writeln!(f, "  {:<width$}  {}", left, directive.description.replace('\n', &continuation))?;
        }
        writeln!(f, "Aliases:")?;
        for (alias, target) in &self.aliases {
            writeln!(f, "  {alias:<width$}  is the alias of {target}")?;
        }
        Ok(())
    }
}
