// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [ICU]-style plural blocks and `{name}` placeholders in translated text.
//!
//! Only exact `=N` rules and the `other` fallback are selected. CLDR
//! categories like `one` or `few` are parsed, but never chosen, since their
//! meaning depends on locale plural rules.
//!
//! [ICU]: https://unicode-org.github.io/icu/userguide/format_parse/messages

use lazy_regex::regex;
use linked_hash_map::LinkedHashMap;
use regex::Captures;

use super::Params;

/// Formats the given `template` against the `params`.
///
/// Every `{name, plural, ...}` block is resolved first, rightmost-first, and
/// then every `{name}` token is replaced by the value of the parameter. Blocks
/// and tokens referring to unknown parameters are left as is.
///
/// ```rust
/// # use pickle::scheme::{plural, Params};
/// let params = [("count", "5")].into_iter().collect::<Params>();
/// assert_eq!(
///     plural::format("{count, plural, =0{no shots} =1{1 shot} other{# shots}}", &params),
///     "5 shots",
/// );
/// ```
#[must_use]
pub fn format(template: &str, params: &Params) -> String {
    let opening = regex!(r"\{\s*(\w+)\s*,\s*plural\s*,");

    let blocks = opening
        .captures_iter(template)
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?.as_str().to_owned())))
        .map(|(whole, name)| (whole.start(), whole.end() - whole.start(), name))
        .collect::<Vec<_>>();

    let mut out = template.to_owned();
    for (start, header_len, name) in blocks.into_iter().rev() {
        let Some(value) = params.get(&name) else {
            continue;
        };
        let Some(end) = closing_brace(&out, start) else {
            tracing::warn!(template, "unbalanced plural block of `{name}`");
            continue;
        };
        let form = {
            let rules = parse_rules(&out[start + header_len..end]);
            select(&rules, value).replace('#', value)
        };
        out.replace_range(start..=end, &form);
    }

    regex!(r"\{(\w+)\}")
        .replace_all(&out, |caps: &Captures<'_>| {
            params
                .get(&caps[1])
                .map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

/// Finds the `}` balancing the `{` at the `open` byte index.
fn closing_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses `=0{...} one{...} other{...}` rules into a keyword to form mapping.
fn parse_rules(body: &str) -> LinkedHashMap<&str, &str> {
    let mut rules = LinkedHashMap::new();
    let mut rest = body;
    loop {
        rest = rest.trim_start();
        let Some(open) = rest.find('{') else {
            break;
        };
        let keyword = rest[..open].trim();
        let Some(close) = closing_brace(rest, open) else {
            break;
        };
        if !keyword.is_empty() {
            _ = rules.insert(keyword, &rest[open + 1..close]);
        }
        rest = &rest[close + 1..];
    }
    rules
}

/// Selects the form for the raw parameter `value`: the exact `=N` rule if any,
/// or the `other` one, or nothing.
fn select<'r>(rules: &LinkedHashMap<&str, &'r str>, value: &str) -> &'r str {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| rules.get(format!("={n}").as_str()).copied())
        .or_else(|| rules.get("other").copied())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().copied().collect()
    }

    const SHOTS: &str = "{count, plural, =0{no shots} =1{1 shot} other{{count} shots}}";

    #[test]
    fn selects_exact_rule_or_other() {
        assert_eq!(format(SHOTS, &params(&[("count", "0")])), "no shots");
        assert_eq!(format(SHOTS, &params(&[("count", "1")])), "1 shot");
        assert_eq!(format(SHOTS, &params(&[("count", "5")])), "5 shots");
    }

    #[test]
    fn hash_is_replaced_by_raw_value() {
        let t = "You have {count, plural, =1{one item} other{# items}}.";
        assert_eq!(format(t, &params(&[("count", "42")])), "You have 42 items.");
    }

    #[test]
    fn missing_other_yields_empty_form() {
        let t = "[{n, plural, =1{single} one{uncategorized}}]";
        assert_eq!(format(t, &params(&[("n", "1")])), "[single]");
        assert_eq!(format(t, &params(&[("n", "2")])), "[]");
    }

    #[test]
    fn resolves_several_and_nested_blocks() {
        let t = "{a, plural, =1{one a} other{# a and {b, plural, =0{no b} other{# b}}}}; \
                 {b, plural, other{{b} b}}";
        assert_eq!(
            format(t, &params(&[("a", "2"), ("b", "0")])),
            "2 a and no b; 0 b",
        );
    }

    #[test]
    fn unknown_params_are_left_verbatim() {
        let t = "{x, plural, other{#}} and {y}";
        assert_eq!(format(t, &params(&[("z", "1")])), t);
    }

    #[test]
    fn substituted_values_are_not_substituted_again() {
        let t = "{greeting}, {name}!";
        assert_eq!(
            format(t, &params(&[("greeting", "Hi {name}"), ("name", "Bob")])),
            "Hi {name}, Bob!",
        );
    }

    #[test]
    fn substitutes_plain_placeholders() {
        assert_eq!(
            format(
                "Good {time}, {name}!",
                &params(&[("name", "Alice"), ("time", "morning")]),
            ),
            "Good morning, Alice!",
        );
    }
}
