use std::{fs::File, io::BufWriter, path::Path};

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::ImageEncoder;
use parblur_image::{Image, ImageSize};

use crate::error::IoError;

/// Largest width or height, in pixels, of an image accepted by [`read_image_rgb8`].
pub const MAX_DIMENSION: usize = 3000;

/// Reads an RGB8 image from the given file path.
///
/// The method tries to read from any image format supported by the image crate, e.g. PPM,
/// PNG or JPEG, and converts the pixels to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be decoded or has a width or height
/// above [`MAX_DIMENSION`].
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION {
        return Err(IoError::ImageTooLarge(
            size.width,
            size.height,
            MAX_DIMENSION,
        ));
    }

    log::debug!("decoded {} from {}", size, file_path.display());

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB8 image to the given file path.
///
/// The format is deduced from the file extension; `.ppm` files are written as binary P6.
///
/// # Arguments
///
/// * `file_path` - The path to the output image.
/// * `image` - The image to write.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let is_ppm = file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        // the generic pnm path would pick PAM (P7), force binary pixmap (P6)
        let writer = BufWriter::new(File::create(file_path)?);
        PnmEncoder::new(writer)
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
            .write_image(
                image.as_slice(),
                image.width() as u32,
                image.height() as u32,
                image::ExtendedColorType::Rgb8,
            )?;
    } else {
        image::save_buffer(
            file_path,
            image.as_slice(),
            image.width() as u32,
            image.height() as u32,
            image::ExtendedColorType::Rgb8,
        )?;
    }

    log::debug!("encoded {} to {}", image.size(), file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_ppm() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.ppm");

        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 5,
                height: 3,
            },
            (0..45).map(|v| (v * 5) as u8).collect(),
        )?;
        write_image_rgb8(&file_path, &image)?;

        let raw = std::fs::read(&file_path)?;
        assert!(raw.starts_with(b"P6"));
        assert!(raw.ends_with(image.as_slice()));

        let read = read_image_rgb8(&file_path)?;
        assert_eq!(read, image);
        Ok(())
    }

    #[test]
    fn write_ppm_upper_case_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.PPM");

        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 1,
            },
            7,
        )?;
        write_image_rgb8(&file_path, &image)?;

        let raw = std::fs::read(&file_path)?;
        assert!(raw.starts_with(b"P6"));
        assert_eq!(read_image_rgb8(&file_path)?, image);
        Ok(())
    }

    #[test]
    fn read_missing_file() {
        let res = read_image_rgb8("does/not/exist.ppm");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn read_too_large() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("wide.ppm");

        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: MAX_DIMENSION + 1,
                height: 1,
            },
            0,
        )?;
        write_image_rgb8(&file_path, &image)?;

        let res = read_image_rgb8(&file_path);
        assert!(matches!(res, Err(IoError::ImageTooLarge(3001, 1, 3000))));
        Ok(())
    }
}
