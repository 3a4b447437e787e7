//! Bulk listing-image export.
//!
//! Walks an Airtable view, downloads every photo attachment on each
//! record, normalizes it to an 800x800 white-padded JPEG, and files it
//! under a per-auction folder as `{lot}-{n}.jpg`. A CSV report of every
//! downloaded image is written alongside the folders.

use std::env;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use secrecy::SecretString;
use serde::Serialize;
use stocklink_api::airtable::{AirtableClient, AirtableError, ListOptions, Record};
use stocklink_api::config::AIRTABLE_API_URL;
use stocklink_api::models::Attachment;
use stocklink_core::Channel;
use tracing::{error, info, warn};

/// Canvas edge length for normalized images.
const CANVAS_SIZE: u32 = 800;
/// JPEG quality for saved images.
const JPEG_QUALITY: u8 = 90;
/// Pause between downloads so the attachment CDN is not hammered.
const DOWNLOAD_THROTTLE: Duration = Duration::from_millis(500);
/// Attachment fields scanned per record, in numbering order.
const IMAGE_FIELDS: [&str; 3] = ["Item Featured Photo", "Photo Files", "Inspection Photos"];

#[derive(thiserror::Error, Debug)]
pub enum ImagesError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("airtable error: {0}")]
    Airtable(#[from] AirtableError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the download report CSV.
#[derive(Debug, Serialize)]
struct ReportRow {
    inventory_no: String,
    filename: String,
    field_name: String,
    auction_code: String,
    view_name: String,
    original_url: String,
    timestamp: String,
}

/// Download and normalize every attachment in the given view.
///
/// Reads `AIRTABLE_API_KEY` and `AIRTABLE_BASE_ID` from the environment.
/// The item table defaults to the channel's table name and can be
/// overridden with `AIRTABLE_TABLE_{CHANNEL}`; the lot-number field
/// defaults to `Lot Number` and can be overridden with `IMAGES_LOT_FIELD`.
pub async fn download(channel: Channel, view: &str, out: &str) -> Result<(), ImagesError> {
    let api_key = env::var("AIRTABLE_API_KEY")
        .map_err(|_| ImagesError::MissingEnv("AIRTABLE_API_KEY"))?;
    let base_id = env::var("AIRTABLE_BASE_ID")
        .map_err(|_| ImagesError::MissingEnv("AIRTABLE_BASE_ID"))?;
    let api_url =
        env::var("AIRTABLE_API_URL").unwrap_or_else(|_| AIRTABLE_API_URL.to_string());

    let table_var = format!("AIRTABLE_TABLE_{}", channel.as_str().to_uppercase());
    let table = env::var(&table_var)
        .unwrap_or_else(|_| channel.default_table_name().to_string());
    let lot_field =
        env::var("IMAGES_LOT_FIELD").unwrap_or_else(|_| "Lot Number".to_string());

    let airtable = AirtableClient::from_parts(
        &api_url,
        &SecretString::from(api_key),
        &base_id,
        Duration::from_secs(30),
    )?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ImagesError::Io(std::io::Error::other(e)))?;

    info!(table, view, "downloading images");

    let options = ListOptions {
        view: Some(view.to_string()),
        page_size: Some(100),
        ..ListOptions::default()
    };
    let records = airtable.list_all(&table, &options).await?;

    if records.is_empty() {
        warn!(view, "no records found; check the view name (case-sensitive) and access");
        return Ok(());
    }

    let out_dir = PathBuf::from(out);
    std::fs::create_dir_all(&out_dir)?;

    let mut report = Vec::new();
    let mut total_images = 0usize;
    let mut total_records = 0usize;
    let mut failed = 0usize;

    for record in &records {
        match process_record(&http, record, &lot_field, view, &out_dir, &mut report).await {
            Ok(count) => {
                total_images += count;
                total_records += 1;
                if total_records % 10 == 0 {
                    info!(total_records, total_images, "progress");
                }
            }
            Err(err) => {
                failed += 1;
                error!(record_id = %record.id, "failed to process record: {err}");
            }
        }
    }

    info!(
        total_records,
        total_images,
        failed,
        out = %out_dir.display(),
        "download complete"
    );

    if !report.is_empty() {
        let report_path = write_report(&out_dir, &report)?;
        info!(report = %report_path.display(), "download report saved");
    }

    Ok(())
}

/// Download every attachment on one record. Returns the image count.
async fn process_record(
    http: &reqwest::Client,
    record: &Record,
    lot_field: &str,
    view: &str,
    out_dir: &Path,
    report: &mut Vec<ReportRow>,
) -> Result<usize, ImagesError> {
    let inventory_no = record
        .fields
        .get(lot_field)
        .map_or_else(|| format!("unknown_{}", record.id), field_to_string);
    let inventory_no = sanitize(&inventory_no);

    let auction_code = record
        .fields
        .get("Auction-code")
        .map_or_else(|| "001".to_string(), field_to_string);
    let auction_code = sanitize(&auction_code);

    let auction_folder = out_dir.join(format!("Auction-{auction_code}"));
    std::fs::create_dir_all(&auction_folder)?;

    info!(lot = %inventory_no, auction = %auction_code, "processing item");

    let mut counter = 1usize;
    for field_name in IMAGE_FIELDS {
        let Some(value) = record.fields.get(field_name) else {
            continue;
        };
        let attachments: Vec<Attachment> = match serde_json::from_value(value.clone()) {
            Ok(list) => list,
            Err(_) => continue,
        };

        for attachment in &attachments {
            let image = match fetch_image(http, &attachment.url).await {
                Some(image) => image,
                None => continue,
            };
            let canvas = normalize(&image);

            let filename = format!("{inventory_no}-{counter}.jpg");
            let filepath = auction_folder.join(&filename);
            save_jpeg(&canvas, &filepath)?;
            info!(file = %filepath.display(), "saved");

            report.push(ReportRow {
                inventory_no: inventory_no.clone(),
                filename,
                field_name: field_name.to_string(),
                auction_code: auction_code.clone(),
                view_name: view.to_string(),
                original_url: attachment.url.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            });

            counter += 1;
            tokio::time::sleep(DOWNLOAD_THROTTLE).await;
        }
    }

    Ok(counter - 1)
}

/// Fetch and decode one attachment. Failures are logged and skipped so a
/// single broken URL does not abort the whole export.
async fn fetch_image(http: &reqwest::Client, url: &str) -> Option<DynamicImage> {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            error!(url, "failed to download image: {err}");
            return None;
        }
    };
    if !response.status().is_success() {
        error!(url, status = %response.status(), "failed to download image");
        return None;
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(url, "failed to read image body: {err}");
            return None;
        }
    };
    match image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .decode()
    {
        Ok(image) => Some(image),
        Err(err) => {
            error!(url, "failed to decode image: {err}");
            None
        }
    }
}

/// Fit the image within the square canvas and center it on white.
///
/// Sources already inside the canvas are padded as-is, never enlarged.
/// Alpha channels are flattened onto white by the RGB conversion of the
/// padded canvas, matching how listing photos are expected to render.
fn normalize(image: &DynamicImage) -> RgbImage {
    let resized = if image.width() > CANVAS_SIZE || image.height() > CANVAS_SIZE {
        image
            .resize(CANVAS_SIZE, CANVAS_SIZE, FilterType::Lanczos3)
            .to_rgb8()
    } else {
        image.to_rgb8()
    };

    let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgb([255, 255, 255]));
    let x = i64::from((CANVAS_SIZE - resized.width()) / 2);
    let y = i64::from((CANVAS_SIZE - resized.height()) / 2);
    image::imageops::overlay(&mut canvas, &resized, x, y);
    canvas
}

fn save_jpeg(canvas: &RgbImage, path: &Path) -> Result<(), ImagesError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    canvas
        .write_with_encoder(encoder)
        .map_err(|e| ImagesError::Io(std::io::Error::other(e)))?;
    Ok(())
}

fn write_report(out_dir: &Path, rows: &[ReportRow]) -> Result<PathBuf, ImagesError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("download_report_{stamp}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Keep only characters safe for filenames.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Render a field value as a plain string for use in names.
fn field_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize("LOT 42/A.jpg"), "LOT42Ajpg");
        assert_eq!(sanitize("B-12_3"), "B-12_3");
    }

    #[test]
    fn test_field_to_string_handles_numbers() {
        assert_eq!(field_to_string(&serde_json::json!("A-1")), "A-1");
        assert_eq!(field_to_string(&serde_json::json!(42)), "42");
    }

    #[test]
    fn test_normalize_pads_landscape_to_square() {
        let src = DynamicImage::new_rgb8(400, 200);
        let canvas = normalize(&src);
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        // Corners stay white when the source is letterboxed.
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(
            canvas.get_pixel(0, CANVAS_SIZE - 1),
            &Rgb([255, 255, 255])
        );
    }

    #[test]
    fn test_normalize_never_upscales_beyond_canvas() {
        let src = DynamicImage::new_rgb8(1600, 1600);
        let canvas = normalize(&src);
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    }

    #[test]
    fn test_normalize_keeps_small_sources_at_native_size() {
        // new_rgb8 zero-fills, so the source region reads back black
        let src = DynamicImage::new_rgb8(100, 50);
        let canvas = normalize(&src);
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        // Centered 100x50 patch; the mid-edges stay white, the center black
        assert_eq!(canvas.get_pixel(CANVAS_SIZE / 2, CANVAS_SIZE / 2), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, CANVAS_SIZE / 2), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(CANVAS_SIZE / 2, 0), &Rgb([255, 255, 255]));
    }
}
