use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::chat::Memory;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)my name is\s+(.+)").expect("valid name regex"));
static GOAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)i want to learn\s+(.+)").expect("valid goal regex"));

/// Updates `memory` from one line of user input. Fields that do not match
/// keep their previous value.
pub fn update_memory(memory: &Memory, input: &str) -> Memory {
    let name = NAME_RE.captures(input)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().split(' ').next())
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let goal = GOAL_RE.captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Memory {
        name: name.unwrap_or_else(|| memory.name.clone()),
        goal: goal.unwrap_or_else(|| memory.goal.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_word_of_name() {
        let memory = update_memory(&Memory::default(), "Hi, My Name Is Ada Lovelace");
        assert_eq!(memory.name, "Ada");
        assert_eq!(memory.goal, "");
    }

    #[test]
    fn extracts_whole_goal() {
        let memory = update_memory(&Memory::default(), "I want to learn dynamic programming");
        assert_eq!(memory.goal, "dynamic programming");
    }

    #[test]
    fn last_match_wins_and_unmatched_fields_are_kept() {
        let first = update_memory(&Memory::default(), "my name is Sam and i want to learn graphs");
        assert_eq!(first.name, "Sam");
        assert_eq!(first.goal, "graphs");

        let second = update_memory(&first, "i want to learn tries");
        assert_eq!(second.name, "Sam");
        assert_eq!(second.goal, "tries");

        let third = update_memory(&second, "what is a heap?");
        assert_eq!(third, second);
    }
}
