//! Canned texts the bot posts.

/// Reply to any liveness keyword.
pub const RUNNING_REPLY: &str = "Yes I'm running";

/// Reply to the `geilste` keyword.
pub const GEILSTE_REPLY: &str = "Eindeutig Fabian!";

/// Reply to a debug-channel message that matched no keyword.
pub const FALLBACK_REPLY: &str = "I did not understand you!";

/// Sent when the privileged user starts typing in the debug channel.
pub const TYPING_SCOLD: &str = "Max, hör auf zu schreiben!";

/// Posted to the debug channel once startup has completed.
pub fn started_notice(bot_name: &str) -> String {
    format!("_{bot_name} has **started** running_")
}

/// Posted to the debug channel on graceful shutdown.
pub fn stopped_notice(bot_name: &str) -> String {
    format!("_{bot_name} has **stopped** running_")
}

/// Posted to the debug channel when a direct channel to a new user cannot be opened.
pub fn onboarding_failed_notice(user_id: &str) -> String {
    format!("failed to establish private channel to {user_id}")
}

const WELCOME: &str = "willkommen bei der “Student Socialization Initiative against COVID-19” (SSI), einer Initiative der \
FSI WInf/IIS der FAU und der FS WIAI der OFU.";

const IDEA: &str = "Die Idee hinter dieser Initiative ist:
- Lernaustausch
- Diskussionsmöglichkeiten
- Initiativen-Koordination Online
- trotz Social Distancing neue Kontakte knüpfen in einem zielorientierten Umfeld für Studierende aus ganz Deutschland";

const CHANNELS: &str = "\"_main\": Hier findet ihr eine stets aktuelle Übersicht der Initiative
\"_news\": Neuigkeiten zu SSI und neue Lern- und Austauschmöglichkeiten
\"_Lectures\": Wenn ihr einen Vortrag zu einem Thema halten wollt, dann könnt ihr das hier vorschlagen oder \
einfach Vorträgen zuhören die hier stattfinden.
\"_Q&A\": Ihr habt ein Problem? Hier könnt ihr nach Lösungen fragen
\"_Topic Suggestions\": Hier könnt ihr neue Themenvorschläge einbringen. Für diese wird dann eine Umfrage \
gestartet, und wenn sich genügend Leute finden, wird ein neuer Channel erstellt
\"_Town Square\": Ein Platz für den ganz offenen Austausch. Hier werden vermutlich die meisten Memes & co. geteilt";

const TOPICS: &str = "Mit welchen Themen willst du dich als Mitglied unserer Initiative auseinandersetzen:
- Machine Learning
- Programmierung
- CS-General
- Zeig mir alles!";

/// The five onboarding messages, in the order they are sent.
///
/// The greeting uses the new user's username when it is known.
pub fn onboarding_script(username: Option<&str>) -> [String; 5] {
    let greeting = match username {
        Some(name) if !name.is_empty() => format!("Hallo {name}!"),
        _ => "Hallo!".to_string(),
    };

    [greeting, WELCOME.to_string(), IDEA.to_string(), CHANNELS.to_string(), TOPICS.to_string()]
}
