//! Prompt text sent for each reading

use chrono::NaiveDate;

const ORACLE_PREAMBLE: &str = "You are an AI oracle. Give a short, poetic fortune.";

/// Fortunes end with this line so the guide can be picked out of the text
const GUIDE_PREFIX: &str = "Your guardian angel is";
const GUIDE_SUFFIX: char = '.';

const GUIDE_INSTRUCTION: &str = "Close with one line naming their guardian angel, \
     written exactly as: \"Your guardian angel is <name>.\"";

/// Used when a fortune does not name a guide
pub const MYSTERIOUS_GUIDE: &str = "a mysterious guide";

/// Stands in for the person's name in image and video prompts
const NAME_FALLBACK: &str = "the seeker";

pub const DEFAULT_ANALYSIS_PROMPT: &str = "Summarize this video and identify key information.";

pub const DAILY_ADVICE_PROMPT: &str = "You are a gentle oracle. Offer one short piece of \
     practical, uplifting advice for today, in two sentences at most.";

/// Long-form date, e.g. `October 17, 2026`
pub fn date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn date_prefix(today: &str) -> String {
    format!("Today is {today}. ")
}

fn given_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

/// Fortune for a birth date
pub fn fortune(today: &str, birth_date: &str, name: Option<&str>) -> String {
    let mut prompt = format!("{}{ORACLE_PREAMBLE} Birth date: {birth_date}.", date_prefix(today));
    if let Some(name) = given_name(name) {
        prompt.push_str(&format!(" The person's name is {name}."));
    }
    prompt.push_str(" Mention their zodiac sign and one thing to watch for this month. ");
    prompt.push_str(GUIDE_INSTRUCTION);
    prompt
}

/// Reading from a photo of a palm or a face
pub fn palm_or_face(today: &str, name: Option<&str>, birth_date: Option<&str>) -> String {
    let mut prompt = format!(
        "{}{ORACLE_PREAMBLE} The image shows a palm or a face. \
         Read the lines or features you see and weave them into the fortune.",
        date_prefix(today)
    );
    if let Some(date) = birth_date {
        prompt.push_str(&format!(" Birth date: {date}."));
    }
    if let Some(name) = given_name(name) {
        prompt.push_str(&format!(" The person's name is {name}."));
    }
    prompt.push(' ');
    prompt.push_str(GUIDE_INSTRUCTION);
    prompt
}

/// Name of the guardian angel announced in a fortune.
///
/// Takes the text between `Your guardian angel is` and the next full stop on
/// the same line. Markdown emphasis around the name is dropped.
pub fn extract_guide(fortune: &str) -> Option<String> {
    fortune.match_indices(GUIDE_PREFIX).find_map(|(start, _)| {
        let rest = fortune[start + GUIDE_PREFIX.len()..].trim_start();
        let end = rest.find(GUIDE_SUFFIX)?;
        let name = &rest[..end];
        if name.contains('\n') {
            return None;
        }
        let name = name.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_');
        (!name.is_empty()).then(|| name.to_string())
    })
}

pub fn guide_portrait(guide: &str, name: Option<&str>) -> String {
    format!(
        "A luminous portrait of {guide}, the guardian angel watching over {}. \
         Soft celestial light, gentle expression, painterly detail, no text.",
        given_name(name).unwrap_or(NAME_FALLBACK)
    )
}

pub fn animate_guide(guide: &str, fortune: &str, name: Option<&str>) -> String {
    format!(
        "{guide}, guardian angel of {}, slowly comes to life: wings unfold, \
         light drifts around them and they look kindly toward the viewer. \
         The mood follows this fortune: {fortune}",
        given_name(name).unwrap_or(NAME_FALLBACK)
    )
}

/// Text read aloud: a date announcement followed by the fortune
pub fn spoken_fortune(today: &str, fortune: &str) -> String {
    format!("Here is your fortune for {today}. {fortune}")
}

pub fn summarize(fortune: &str) -> String {
    format!("Summarize this fortune in one or two plain sentences: \"{fortune}\"")
}
