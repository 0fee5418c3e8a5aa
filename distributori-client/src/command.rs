use crate::mutation::{parse_price, DistributorForm};

pub const HELP_TEXT: &str = "\
Commands:
  /load                              reload every distributor
  /search <id or city>               look up by id, or by part of a city name
  /add id=.. provincia=.. citta=.. benzina=.. diesel=..
       prezzo_benzina=.. prezzo_diesel=.. lat=.. lon=..
  /prices <provincia> [benzina=..] [diesel=..]
  /markers                           list what is on the map
  /help
  /quit
Values containing spaces can be quoted: citta=\"Reggio Emilia\"";

/// Command prefix types understood by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Load,
    Search,
    Add,
    Prices,
    Markers,
    Help,
    Quit,
    Unknown,
}

impl CommandType {
    /// Parse command type from prefix, `/` and `\` are interchangeable
    pub fn from_prefix(prefix: &str) -> Self {
        let Some(name) = prefix.strip_prefix(['/', '\\']) else {
            return CommandType::Unknown;
        };
        match name.to_lowercase().as_str() {
            "load" | "l" => CommandType::Load,
            "search" | "s" => CommandType::Search,
            "add" | "a" => CommandType::Add,
            "prices" | "p" => CommandType::Prices,
            "markers" | "m" => CommandType::Markers,
            "help" | "h" => CommandType::Help,
            "quit" | "q" | "exit" => CommandType::Quit,
            _ => CommandType::Unknown,
        }
    }
}

/// A console line turned into an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load,
    Search(String),
    Add(DistributorForm),
    Prices {
        provincia: String,
        benzina: Option<f64>,
        diesel: Option<f64>,
    },
    Markers,
    Help,
    Quit,
    /// Anything that could not be parsed, with the reason
    Invalid(String),
}

impl Command {
    /// # Examples
    /// ```
    /// use distributori_client::command::Command;
    ///
    /// assert_eq!(Command::parse("/search Roma"), Command::Search("Roma".to_string()));
    /// ```
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let (prefix, rest) = match trimmed.find(char::is_whitespace) {
            Some(pos) => (&trimmed[..pos], trimmed[pos..].trim()),
            None => (trimmed, ""),
        };

        match CommandType::from_prefix(prefix) {
            CommandType::Load => Command::Load,
            CommandType::Search => Command::Search(unquote(rest).to_string()),
            CommandType::Add => parse_add(rest),
            CommandType::Prices => parse_prices(rest),
            CommandType::Markers => Command::Markers,
            CommandType::Help => Command::Help,
            CommandType::Quit => Command::Quit,
            CommandType::Unknown => {
                Command::Invalid(format!("Unknown command '{}', try /help", prefix))
            }
        }
    }
}

fn parse_add(arguments: &str) -> Command {
    let mut form = DistributorForm::default();

    for token in split_arguments(arguments) {
        let Some((key, value)) = token.split_once('=') else {
            return Command::Invalid(format!("Expected key=value, got '{}'", token));
        };
        let slot = match key {
            "id" => &mut form.id,
            "provincia" => &mut form.provincia,
            "citta" => &mut form.citta,
            "benzina" => &mut form.benzina,
            "diesel" => &mut form.diesel,
            "prezzo_benzina" => &mut form.prezzo_benzina,
            "prezzo_diesel" => &mut form.prezzo_diesel,
            "lat" => &mut form.lat,
            "lon" => &mut form.lon,
            _ => return Command::Invalid(format!("Unknown field '{}'", key)),
        };
        *slot = value.to_string();
    }

    Command::Add(form)
}

fn parse_prices(arguments: &str) -> Command {
    let mut tokens = split_arguments(arguments).into_iter();
    let provincia = tokens.next().unwrap_or_default();
    let mut benzina = None;
    let mut diesel = None;

    for token in tokens {
        match token.split_once('=') {
            Some(("benzina" | "prezzo_benzina", value)) => benzina = parse_price(value),
            Some(("diesel" | "prezzo_diesel", value)) => diesel = parse_price(value),
            _ => return Command::Invalid(format!("Unexpected price argument '{}'", token)),
        }
    }

    Command::Prices {
        provincia,
        benzina,
        diesel,
    }
}

/// Drop one pair of double quotes wrapping the whole text.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Whitespace-separated tokens; double quotes group words and are dropped.
fn split_arguments(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }

    tokens
}
