//! Rendering of beatmapsets into push-message text.
//!
//! Rendering is pure and deterministic; the poller concatenates the blocks
//! into one digest per cycle.

use crate::catalog::types::Beatmapset;

/// Header line of the aggregate push message.
pub const DIGEST_HEADER: &str = "Recent ranked map:";

/// Render one beatmapset as a display block:
///
/// ```text
/// [01/01 08:02:00]
/// Artist - Song Title (Mapper)
/// Insane : osu 5.25☆
/// https://osu.ppy.sh/beatmapsets/123456
/// ```
pub fn render_set(set: &Beatmapset) -> String {
    let mut block = String::new();
    block.push_str(&format!("[{}]\n", set.ranked_at.format("%m/%d %H:%M:%S")));
    block.push_str(&format!(
        "{} - {} ({})\n",
        set.artist, set.title, set.creator
    ));
    for bm in &set.beatmaps {
        block.push_str(&format!("{} : {} {:.2}☆\n", bm.version, bm.mode, bm.stars));
    }
    block.push_str(&set.url);
    block.push('\n');
    block
}

/// Render the aggregate digest for one poll cycle, in fetch order.
pub fn render_digest(sets: &[Beatmapset]) -> String {
    let mut message = String::from(DIGEST_HEADER);
    for set in sets {
        message.push('\n');
        message.push_str(&render_set(set));
    }
    message
}
