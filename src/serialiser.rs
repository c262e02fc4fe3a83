use crate::overlay::PreviewSurface;
use crate::sprite::ClipRect;

use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

/// Collects the style changes a preview makes, so they can be printed as
/// CSS rules for the holder and image elements. The image rule also carries
/// a `src` entry; it is the element's image URL, not a CSS property.
#[derive(Debug, Default)]
pub struct CssSurface {
    holder: Vec<(&'static str, String)>,
    image: Vec<(&'static str, String)>,
}

fn set(decls: &mut Vec<(&'static str, String)>, property: &'static str, value: String) {
    match decls.iter_mut().find(|(p, _)| *p == property) {
        Some(decl) => decl.1 = value,
        None => decls.push((property, value)),
    }
}

impl PreviewSurface for CssSurface {
    fn set_image_src(&mut self, src: &str) {
        set(&mut self.image, "src", format!("\"{}\"", src));
    }

    fn set_size(&mut self, width: f64, height: f64) {
        set(&mut self.holder, "width", px(width));
        set(&mut self.holder, "height", px(height));
    }

    fn set_crop(&mut self, image_left: f64, image_top: f64, clip: ClipRect) {
        set(&mut self.image, "left", px(image_left));
        set(&mut self.image, "top", px(image_top));
        set(&mut self.image, "clip", clip_value(clip));
    }

    fn set_left(&mut self, left: f64) {
        set(&mut self.holder, "left", px(left));
    }
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

fn clip_value(clip: ClipRect) -> String {
    format!(
        "rect({}px,{}px,{}px,{}px)",
        clip.top, clip.right, clip.bottom, clip.left
    )
}

pub fn serialise<W: Write>(surface: &CssSurface, output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_rule(&mut writer, ".vjs-sneakpeek-holder", &surface.holder)
        .context("Failed to write to output.")?;
    write_rule(&mut writer, ".vjs-sneakpeek", &surface.image)
        .context("Failed to write to output.")?;
    writer.flush().context("Failed to write to output.")?;
    Ok(())
}

fn write_rule<W: Write>(
    buf: &mut W,
    selector: &str,
    decls: &[(&'static str, String)],
) -> Result<()> {
    if decls.is_empty() {
        return Ok(());
    }
    writeln!(buf, "{} {{", selector)?;
    for (property, value) in decls {
        writeln!(buf, "    {}: {};", property, value)?;
    }
    writeln!(buf, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    macro_rules! test_px {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;
                assert_eq!(px(input), expected);
            }
        )*
        }
    }

    test_px! {
        test_px_0: (0.0, "0px"),
        test_px_1: (120.0, "120px"),
        test_px_2: (-1000.0, "-1000px"),
        test_px_3: (40.5, "40.5px"),
    }

    #[test]
    fn writes_holder_and_image_rules() {
        let mut surface = CssSurface::default();
        surface.set_image_src("sprite.jpg");
        surface.set_size(120.0, 68.0);
        surface.set_crop(
            -120.0,
            0.0,
            ClipRect {
                top: 0.0,
                right: 240.0,
                bottom: 68.0,
                left: 120.0,
            },
        );
        surface.set_left(40.0);

        let mut buf = Cursor::new(vec![]);
        serialise(&surface, &mut buf).expect("Failed to write to buffer");

        assert_eq!(
            String::from_utf8(buf.into_inner()).unwrap(),
            ".vjs-sneakpeek-holder {\n\
             \x20   width: 120px;\n\
             \x20   height: 68px;\n\
             \x20   left: 40px;\n\
             }\n\
             .vjs-sneakpeek {\n\
             \x20   src: \"sprite.jpg\";\n\
             \x20   left: -120px;\n\
             \x20   top: 0px;\n\
             \x20   clip: rect(0px,240px,68px,120px);\n\
             }\n"
        );
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let mut surface = CssSurface::default();
        surface.set_left(40.0);
        surface.set_left(-1000.0);

        let mut buf = Cursor::new(vec![]);
        serialise(&surface, &mut buf).unwrap();

        assert_eq!(
            String::from_utf8(buf.into_inner()).unwrap(),
            ".vjs-sneakpeek-holder {\n    left: -1000px;\n}\n"
        );
    }

    #[test]
    fn empty_surface_writes_nothing() {
        let surface = CssSurface::default();

        let mut buf = Cursor::new(vec![]);
        serialise(&surface, &mut buf).unwrap();
        assert!(buf.into_inner().is_empty());
    }
}
