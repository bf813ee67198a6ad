//! Dry-run rendering: blocks to text, no side effects.

use std::fmt::Write;

use crate::block::{Block, BlockKind};

/// Render blocks as a deterministic, human-readable listing.
///
/// One stanza per block: index, section, narration, then the actions
/// (or the pause / narration-only marker). Never touches the network
/// or the desktop.
pub fn render_dry_run(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        let _ = writeln!(out, "--- Block {} ---", index + 1);
        if let Some(section) = &block.section {
            let _ = writeln!(out, "  Section: {section}");
        }
        if let Some(narration) = &block.narration {
            for line in narration.lines() {
                let _ = writeln!(out, "  [SAY] {line}");
            }
        }
        match &block.kind {
            BlockKind::Action => {
                for action in &block.actions {
                    let _ = writeln!(out, "  {action}");
                }
            }
            BlockKind::Pause(None) => {
                let _ = writeln!(out, "  [PAUSE] (wait for Enter)");
            }
            BlockKind::Pause(Some(secs)) => {
                let _ = writeln!(out, "  [PAUSE {secs}] (auto-continue)");
            }
            BlockKind::NarrationOnly => {
                let _ = writeln!(out, "  (narration only)");
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::group_blocks;
    use crate::script::parse_script;

    #[test]
    fn renders_every_block_in_order() {
        let script = parse_script(
            "## Section: Intro\n[SAY] Hello\n[FOCUS] Terminal\n[TYPE] ls\n[RUN]\n[PAUSE 3]\n[SAY] Done\n",
        )
        .unwrap();
        let text = render_dry_run(&group_blocks(&script));

        assert!(text.contains("--- Block 1 ---"));
        assert!(text.contains("Section: Intro"));
        assert!(text.contains("[SAY] Hello"));
        assert!(text.contains("[FOCUS] Terminal"));
        assert!(text.contains("[TYPE] ls"));
        assert!(text.contains("--- Block 2 ---"));
        assert!(text.contains("[PAUSE 3] (auto-continue)"));
        assert!(text.contains("--- Block 3 ---"));
        assert!(text.contains("(narration only)"));
    }

    #[test]
    fn empty_block_list_renders_empty() {
        assert_eq!(render_dry_run(&[]), "");
    }

    #[test]
    fn rendering_is_deterministic() {
        let script = parse_script("[TYPE] x\n[RUN]\n").unwrap();
        let blocks = group_blocks(&script);
        assert_eq!(render_dry_run(&blocks), render_dry_run(&blocks));
    }
}
