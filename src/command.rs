use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Films,
    People,
    Favorites,
    Film(String),
    Person(String),
    Search(String),
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.strip_prefix(':').unwrap_or(input).trim();

    if input.is_empty() {
        return None;
    }

    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (input, ""),
    };

    match cmd {
        "films" => Some(Command::Films),
        "people" | "p" => Some(Command::People),
        "favorites" | "fav" | "f" => Some(Command::Favorites),
        "film" if !args.is_empty() => parse_resource_id(args, "films").map(Command::Film),
        "person" if !args.is_empty() => parse_resource_id(args, "people").map(Command::Person),
        "search" => Some(Command::Search(args.to_owned())),
        "refresh" | "r" => Some(Command::Refresh),
        "help" | "h" => Some(Command::Help),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

/// Accept a raw numeric id or a resource URL such as
/// `https://swapi.info/api/films/1/` and return the id.
pub fn parse_resource_id(input: &str, collection: &str) -> Option<String> {
    let trimmed = input.trim();

    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(trimmed.to_owned());
    }

    let url = Url::parse(trimmed).ok()?;

    // Path: .../<collection>/<id>[/]
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [.., kind, id] if *kind == collection && id.chars().all(|c| c.is_ascii_digit()) => {
            Some((*id).to_owned())
        }
        _ => None,
    }
}
