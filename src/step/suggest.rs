// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Generation of ready-to-paste step definitions for unmatched steps.
//!
//! Best-effort only: quoted substrings become [`ParamKind::String`]
//! placeholders, bare decimals become [`ParamKind::Double`] ones and bare
//! integers become [`ParamKind::Int`] ones.

use std::fmt::Write as _;

use derive_more::with_trait::Display;
use itertools::Itertools as _;
use lazy_regex::regex;

use crate::pattern::ParamKind;

/// Suggested step definition for an unmatched step text.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{snippet}")]
pub struct Suggestion {
    /// Step phrase with `{placeholder}`s.
    pub pattern: String,

    /// Non-[`ParamKind::String`] placeholders along with their kinds.
    pub kinds: Vec<(String, ParamKind)>,

    /// Rust source of the registration and a stub step [`fn`].
    pub snippet: String,
}

/// Suggests a step definition for the given unmatched step `text`.
#[must_use]
pub fn suggest(text: &str) -> Suggestion {
    let token = regex!(r#""[^"]*"|'[^']*'|\b\d+\.\d+\b|\b\d+\b"#);

    let mut pattern = String::with_capacity(text.len());
    let mut kinds = Vec::new();
    let (mut strings, mut floats, mut ints) = (0, 0, 0);
    let mut last = 0;
    for m in token.find_iter(text) {
        pattern.push_str(&escape_braces(&text[last..m.start()]));
        let raw = m.as_str();
        if raw.starts_with(['"', '\'']) {
            strings += 1;
            let quote = &raw[..1];
            let name = numbered("string", strings);
            _ = write!(pattern, "{quote}{{{name}}}{quote}");
        } else if raw.contains('.') {
            floats += 1;
            let name = numbered("float", floats);
            _ = write!(pattern, "{{{name}}}");
            kinds.push((name, ParamKind::Double));
        } else {
            ints += 1;
            let name = numbered("int", ints);
            _ = write!(pattern, "{{{name}}}");
            kinds.push((name, ParamKind::Int));
        }
        last = m.end();
    }
    pattern.push_str(&escape_braces(&text[last..]));

    let snippet = snippet(&fn_name(text), &pattern, &kinds);
    Suggestion { pattern, kinds, snippet }
}

/// Returns `base` for the first placeholder and `base{n}` for the others.
fn numbered(base: &str, n: usize) -> String {
    if n == 1 {
        base.to_owned()
    } else {
        format!("{base}{n}")
    }
}

/// Literal braces in a step text would be read back as placeholders.
fn escape_braces(s: &str) -> String {
    s.replace(['{', '}'], "")
}

/// Derives a snake_case [`fn`] name from the literal words of the `text`.
fn fn_name(text: &str) -> String {
    let words = regex!(r#""[^"]*"|'[^']*'"#)
        .replace_all(text, " ")
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .join("_");
    match words.chars().next() {
        None => "step".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("step_{words}"),
        Some(_) => words,
    }
}

fn snippet(name: &str, pattern: &str, kinds: &[(String, ParamKind)]) -> String {
    let registration = if kinds.is_empty() {
        format!("registry.step({pattern:?}, {name})?")
    } else {
        let kinds = kinds
            .iter()
            .map(|(n, k)| format!("({n:?}, ParamKind::{k:?})"))
            .join(", ");
        format!("registry.step_with_kinds({pattern:?}, [{kinds}], {name})?")
    };
    format!(
        "{registration};\n\n\
         fn {name}(world: &mut World, ctx: Context) -> BoxFuture<'_, anyhow::Result<()>> {{\n    \
             Box::pin(async move {{ todo!(\"implement `{name}`\") }})\n\
         }}\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{StepPattern, Value};

    #[test]
    fn quoted_text_and_integers_become_placeholders() {
        let s = suggest(r#"I transfer 25 coins from "Alice" to 'Bob' in 3 steps"#);
        assert_eq!(
            s.pattern,
            r#"I transfer {int} coins from "{string}" to '{string2}' in {int2} steps"#,
        );
        assert_eq!(
            s.kinds,
            [("int".to_owned(), ParamKind::Int), ("int2".to_owned(), ParamKind::Int)],
        );
        assert!(s.snippet.contains("fn i_transfer_25_coins_from_to_in_3_steps("));
        assert!(s.snippet.contains("step_with_kinds("));
    }

    #[test]
    fn suggested_pattern_matches_the_original_text() {
        let text = r#"the "blue" box holds 12 items"#;
        let s = suggest(text);
        let p = StepPattern::with_kinds(&s.pattern, s.kinds.clone()).unwrap();
        assert_eq!(
            p.matches(text).unwrap(),
            Some(vec![Value::from("blue"), Value::Int(12)]),
        );
    }

    #[test]
    fn decimals_become_double_placeholders() {
        let text = "I pay 2.50 for 3 apples";
        let s = suggest(text);
        assert_eq!(s.pattern, "I pay {float} for {int} apples");
        assert_eq!(
            s.kinds,
            [("float".to_owned(), ParamKind::Double), ("int".to_owned(), ParamKind::Int)],
        );
        let p = StepPattern::with_kinds(&s.pattern, s.kinds.clone()).unwrap();
        assert_eq!(
            p.matches(text).unwrap(),
            Some(vec![Value::Double(2.5), Value::Int(3)]),
        );
    }

    #[test]
    fn plain_text_is_kept_literal() {
        let s = suggest("the door is open");
        assert_eq!(s.pattern, "the door is open");
        assert!(s.kinds.is_empty());
        assert!(s.snippet.starts_with(r#"registry.step("the door is open", the_door_is_open)?;"#));
    }
}
