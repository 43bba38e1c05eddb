//! Plain text and HTML serialization of a grid.

use std::io::{self, Write};

use crate::ascii::Grid;

/// Write one line per grid row.
pub fn write_text<W: Write>(grid: &Grid, writer: &mut W) -> io::Result<()> {
    let mut line = String::with_capacity(grid.columns());
    for r in 0..grid.rows() {
        line.clear();
        line.extend((0..grid.columns()).map(|c| grid.glyph_at(r, c)));
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn escape_html(ch: char, out: &mut String) {
    match ch {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(ch),
    }
}

/// Write a standalone HTML page showing the grid in color on black.
///
/// Runs of the same color share one `<span>`; spaces never open a span.
pub fn write_html<W: Write>(grid: &Grid, writer: &mut W, title: &str) -> io::Result<()> {
    let mut escaped_title = String::new();
    title.chars().for_each(|c| escape_html(c, &mut escaped_title));
    write!(
        writer,
        "<html><head><title>Ascii Picture {}</title></head>",
        escaped_title
    )?;
    writer.write_all(b"<body><div style=\"background: black; letter-spacing: 3px;\">\n")?;
    writer.write_all(b"<pre>")?;

    let mut line = String::new();
    for r in 0..grid.rows() {
        line.clear();
        line.push_str("<span>");
        let mut last_color = None;
        for c in 0..grid.columns() {
            let ch = grid.glyph_at(r, c);
            if ch == ' ' {
                line.push(' ');
                continue;
            }
            let color = grid.color_at(r, c);
            if last_color != Some(color) {
                line.push_str(&format!(
                    "</span><span style=\"color:#{:06x}\">",
                    color & 0x00ff_ffff
                ));
                last_color = Some(color);
            }
            escape_html(ch, &mut line);
        }
        line.push_str("</span>\n");
        writer.write_all(line.as_bytes())?;
    }

    writer.write_all(b"</pre>\n")?;
    writer.write_all(b"</div></body></html>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::{ColorKind, ColorMode, Palette};

    fn sample() -> Grid {
        let mode = ColorMode::with_palette(ColorKind::AnsiQuantized, Palette::new(" <@").unwrap());
        Grid::from_parts(
            2,
            3,
            &mode,
            vec![0, 2, 2, 1, 2, 0],
            Some(vec![0xffff_0000, 0xff00_ff00, 0xff00_ff00, 0xff00_00ff, 0xffff_ffff, 0xff00_0000]),
        )
        .unwrap()
    }

    #[test]
    fn test_write_text() {
        let mut out = Vec::new();
        write_text(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " @@\n<@ \n");
    }

    #[test]
    fn test_write_text_empty_grid() {
        let mut out = Vec::new();
        write_text(&Grid::new(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_html() {
        let mut out = Vec::new();
        write_html(&sample(), &mut out, "a&b").unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.starts_with("<html><head><title>Ascii Picture a&amp;b</title></head>"));
        // Same color run shares a span; leading space has none
        assert!(html.contains("<span> </span><span style=\"color:#00ff00\">@@</span>\n"));
        assert!(html.contains("<span style=\"color:#0000ff\">&lt;</span><span style=\"color:#ffffff\">@ </span>\n"));
        assert!(html.ends_with("</pre>\n</div></body></html>"));
    }
}
