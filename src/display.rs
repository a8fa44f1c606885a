use anyhow::{anyhow, Result};
use viuer::{print, Config as ViuerConfig};
use crate::cli::Args;
use crate::dicom::Metadata;
use crate::image::RasterImage;
use std::io::{IsTerminal, Write};
use std::path::Path;

pub fn print_image(image: &RasterImage, metadata: &Metadata, args: &Args) -> Result<()> {
    let is_tty = std::io::stdout().is_terminal();

    // PAR = (vertical, horizontal): (1,1)=square, (2,1)=2x tall pixels
    let par_ratio = metadata.image.pixel_aspect_ratio
        .map_or(1.0, |par| par.ratio());

    let (config_width, config_height) = match (args.width, args.height) {
        (Some(w), ..) => (Some(w), None),
        (None, Some(h)) => (None, Some((f64::from(h) * par_ratio).round() as u32)),
        (None, None) => (Some(24), None),
    };

    let config = ViuerConfig {
        width: config_width,
        height: config_height,
        absolute_offset: false,
        use_kitty: is_tty,
        use_iterm: is_tty,
        use_sixel: is_tty,
        ..Default::default()
    };

    let image = image.to_dynamic_image()?;

    std::io::stdout().flush()
        .map_err(|e| anyhow!("Failed to flush stdout: {e}"))?;

    print(&image, &config)
        .map_err(|e| anyhow!("Failed to display image: {e}"))?;

    Ok(())
}

/// Save the preview as a PNG
pub fn save_png(image: &RasterImage, path: &Path) -> Result<()> {
    image
        .to_dynamic_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| anyhow!("Failed to write PNG {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let raster = RasterImage::from_gray(2, 1, &[0, 255]);
        save_png(&raster, &path).unwrap();

        let decoded = ::image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(1, 0).0, [255]);
    }
}
