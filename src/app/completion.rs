use crate::irc::Session;
use crate::ui::Completion;

/// Nickname completions for the word before `cursor`, drawn from the members
/// of `buffer`. A non-empty result ends with the unchanged input so cycling
/// can return to it.
pub fn complete_nick(
    session: Option<&dyn Session>,
    buffer: &str,
    cursor: usize,
    text: &[char],
) -> Vec<Completion> {
    let Some(session) = session else {
        return Vec::new();
    };
    if text.is_empty() {
        return Vec::new();
    }
    let cursor = cursor.min(text.len());

    let start = text[..cursor]
        .iter()
        .rposition(|&c| c == ' ')
        .map_or(0, |i| i + 1);
    let word: String = text[start..cursor].iter().collect();
    let word_cf = session.casemap(&word);

    let mut completions: Vec<Completion> = session
        .names(buffer)
        .into_iter()
        .filter(|member| session.casemap(&member.name).starts_with(&word_cf))
        .map(|member| {
            let mut replacement: Vec<char> = member.name.chars().collect();
            if start == 0 {
                replacement.push(':');
            }
            replacement.push(' ');

            let mut completed = text[..start].to_vec();
            completed.extend_from_slice(&replacement);
            completed.extend_from_slice(&text[cursor..]);
            Completion {
                text: completed,
                cursor: start + replacement.len(),
            }
        })
        .collect();

    if !completions.is_empty() {
        completions.push(Completion {
            text: text.to_vec(),
            cursor,
        });
    }
    completions
}
