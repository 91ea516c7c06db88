use std::io;

use crossterm::{queue, style};

/// Print a menu item, bolding the key names inside `[...]` and dimming the rest.
pub fn print_menu_item(stdout: &mut io::Stdout, item: &str) -> anyhow::Result<()> {
    for (text, is_key) in split_keys(item) {
        let attr = if is_key {
            style::Attribute::Bold
        } else {
            style::Attribute::Dim
        };
        queue!(
            stdout,
            style::SetAttribute(attr),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

/// Split `item` into runs, flagging the bracketed key runs. An unclosed `[`
/// leaves the remainder as plain text.
fn split_keys(item: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            runs.push((rest, false));
            break;
        };
        if open > 0 {
            runs.push((&rest[..open], false));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                runs.push((&rest[..=close], true));
                rest = &rest[close + 1..];
            }
            None => {
                runs.push((rest, false));
                break;
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_mark_keys() {
        assert_eq!(
            split_keys("[q][Esc] salir"),
            vec![("[q]", true), ("[Esc]", true), (" salir", false)]
        );
    }

    #[test]
    fn unclosed_bracket_is_plain() {
        assert_eq!(split_keys("a [b"), vec![("a ", false), ("[b", false)]);
    }
}
