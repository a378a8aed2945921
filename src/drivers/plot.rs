use std::fs;
use std::io::Write;
use std::path::Path;
use chrono::{Duration, NaiveDateTime};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use log::debug;
use plotters::coord::types::RangedDateTime;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use crate::config::{AnnotationStyle, ChartConfig, PANEL_COUNT};
use crate::drivers::error::GraphError;
use crate::drivers::frame::{ShadeInterval, TimeSeriesFrame};
const TIME_FORMAT: &str = "%H:%M:%S";
fn font<'a>(config: &'a ChartConfig, size_px: f64) -> FontDesc<'a> {
    let style = if config.font.bold {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    FontDesc::new(FontFamily::Name(&config.font.family), size_px, style)
}
fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}
/// Fails unless the path names a PNG file.
pub fn check_output_format(path: &Path) -> Result<(), GraphError> {
    match ImageFormat::from_path(path)? {
        ImageFormat::Png => Ok(()),
        other => Err(GraphError::RenderFailure(format!(
            "unsupported output format {other:?} for {}",
            path.display()
        ))),
    }
}
/// Render both panels, the shaded band and the annotation into PNG bytes.
pub fn render_figure(
    frame: &TimeSeriesFrame,
    shade: &ShadeInterval,
    config: &ChartConfig,
) -> Result<Vec<u8>, GraphError> {
    if frame.series.len() != PANEL_COUNT {
        return Err(GraphError::PanelCount {
            expected: PANEL_COUNT,
            actual: frame.series.len(),
        });
    }
    if let Some(empty) = frame.series.iter().find(|s| s.is_empty()) {
        return Err(GraphError::EmptySeries(empty.name.clone()));
    }
    let (first, last) = match (frame.first_timestamp(), frame.last_timestamp()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(GraphError::EmptySeries("time index".into())),
    };
    if shade.end_index >= frame.len() || shade.begin_index > shade.end_index {
        return Err(GraphError::InvalidShadeInterval {
            begin: shade.begin,
            end: shade.end,
            first,
            last,
        });
    }
    // A single sample still needs a non-empty axis.
    let x_end = if last > first {
        last
    } else {
        first + Duration::seconds(1)
    };
    let (width, height) = config.pixel_size();
    let font_px = config.font_px();
    let label_font = font(config, font_px);
    let left_area = (font_px * 4.0).ceil() as u32 + 10;
    let bottom_area = (font_px * 5.5).ceil() as u32 + 10;
    let margin = (font_px * 1.5).ceil() as u32;
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let body = root.titled(&config.title_text(), font(config, font_px * 1.2))?;
        let panels = body.split_evenly((PANEL_COUNT, 1));
        let time_fmt = |t: &NaiveDateTime| t.format(TIME_FORMAT).to_string();
        for (idx, ((panel, series), series_cfg)) in panels
            .iter()
            .zip(&frame.series)
            .zip(&config.series)
            .enumerate()
        {
            let is_bottom = idx == PANEL_COUNT - 1;
            let (min, max) = series
                .smoothed_bounds()
                .ok_or_else(|| GraphError::EmptySeries(series.name.clone()))?;
            let (y_lo, y_hi) = config.y_limits.range(min, max);
            debug!(
                "panel {idx} ({}): data {min:.3}..{max:.3}, axis {y_lo:.3}..{y_hi:.3}",
                series.name
            );
            let mut chart = ChartBuilder::on(panel)
                .margin(margin)
                .set_label_area_size(LabelAreaPosition::Left, left_area)
                .set_label_area_size(
                    LabelAreaPosition::Bottom,
                    if is_bottom { bottom_area } else { 0 },
                )
                .build_cartesian_2d(RangedDateTime::from(first..x_end), y_lo..y_hi)?;
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(config.x_ticks)
                .y_labels(5)
                .x_label_formatter(&time_fmt)
                .x_label_style(label_font.clone().transform(FontTransform::Rotate90))
                .y_label_style(label_font.clone());
            if !series_cfg.grid {
                mesh.disable_mesh();
            }
            mesh.draw()?;
            let shade_style = rgb(config.shade_color).mix(config.shade_alpha).filled();
            chart.draw_series(std::iter::once(Rectangle::new(
                [(shade.begin, y_lo), (shade.end, y_hi)],
                shade_style,
            )))?;
            let color = rgb(series_cfg.color);
            chart
                .draw_series(LineSeries::new(
                    frame
                        .time_index
                        .iter()
                        .copied()
                        .zip(series.smoothed.iter().copied()),
                    color.stroke_width(2),
                ))?
                .label(&series_cfg.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::LowerLeft)
                .label_font(label_font.clone())
                .border_style(BLACK.mix(0.3))
                .background_style(WHITE.mix(0.8))
                .draw()?;
            if idx != 0 {
                continue;
            }
            // Arrow from the annotation text to the line at the start of the shade.
            let head_value = series.smoothed[shade.begin_index];
            let head = chart.backend_coord(&(shade.begin, head_value));
            let anchor = match config.annotation {
                AnnotationStyle::Fixed {
                    minutes_before,
                    y_multiple,
                } => {
                    let text_time = Duration::try_minutes(minutes_before)
                        .and_then(|d| shade.begin.checked_sub_signed(d))
                        .ok_or_else(|| {
                            GraphError::Config(format!(
                                "annotation {minutes_before} minutes before {} is out of range",
                                shade.begin
                            ))
                        })?;
                    chart.backend_coord(&(text_time, head_value * y_multiple))
                }
                AnnotationStyle::Offset { dx, dy } => {
                    (head.0.saturating_add(dx), head.1.saturating_sub(dy))
                }
            };
            let text_style = TextStyle::from(label_font.clone());
            let (text_w, text_h) = root.estimate_text_size(&config.annotation_text, &text_style)?;
            let (x_range, y_range) = chart.plotting_area().get_pixel_range();
            let text_pos = clamp_box(anchor, (text_w as i32, text_h as i32), x_range, y_range);
            root.draw(&Text::new(
                config.annotation_text.clone(),
                text_pos,
                text_style,
            ))?;
            let arm = (50.0 * config.dpi as f64 / 72.0).round() as i32;
            let path = arrow_path(text_pos, (text_w as i32, text_h as i32), head, arm);
            root.draw(&PathElement::new(path.clone(), BLACK.stroke_width(1)))?;
            if let Some(wings) = arrow_head(path[path.len() - 2], head, font_px * 0.8) {
                for wing in wings {
                    root.draw(&PathElement::new(vec![wing, head], BLACK.stroke_width(1)))?;
                }
            }
        }
        root.present()?;
    }
    encode_png(&buffer, width, height)
}
/// Top-left corner of a `size` box placed at `anchor`, pushed inside the given pixel ranges.
fn clamp_box(
    anchor: (i32, i32),
    size: (i32, i32),
    x_range: std::ops::Range<i32>,
    y_range: std::ops::Range<i32>,
) -> (i32, i32) {
    let x = anchor.0.min(x_range.end - size.0).max(x_range.start);
    let y = anchor.1.min(y_range.end - size.1).max(y_range.start);
    (x, y)
}
/// Text edge, then a horizontal arm toward the head, then the head itself.
fn arrow_path(
    text_pos: (i32, i32),
    text_size: (i32, i32),
    head: (i32, i32),
    arm: i32,
) -> Vec<(i32, i32)> {
    let gap = 4;
    let mid_y = text_pos.1 + text_size.1 / 2;
    let center_x = text_pos.0 + text_size.0 / 2;
    let (start, arm_end) = if head.0 >= center_x {
        let start = (text_pos.0 + text_size.0 + gap, mid_y);
        (start, ((start.0 + arm).min(head.0.max(start.0)), mid_y))
    } else {
        let start = (text_pos.0 - gap, mid_y);
        (start, ((start.0 - arm).max(head.0.min(start.0)), mid_y))
    };
    vec![start, arm_end, head]
}
/// The two short strokes of an arrowhead pointing from `from` to `head`.
fn arrow_head(from: (i32, i32), head: (i32, i32), length: f64) -> Option<[(i32, i32); 2]> {
    let dx = (head.0 - from.0) as f64;
    let dy = (head.1 - from.1) as f64;
    let norm = dx.hypot(dy);
    if norm < 1.0 {
        return None;
    }
    let (ux, uy) = (dx / norm, dy / norm);
    let spread = 25f64.to_radians();
    let wing = |angle: f64| {
        let (s, c) = angle.sin_cos();
        let bx = -(ux * c - uy * s);
        let by = -(ux * s + uy * c);
        (
            head.0 + (bx * length).round() as i32,
            head.1 + (by * length).round() as i32,
        )
    };
    Some([wing(spread), wing(-spread)])
}
fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, GraphError> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(GraphError::RenderFailure(format!(
            "pixel buffer holds {} bytes, {width}x{height} RGB needs {expected}",
            rgb.len()
        )));
    }
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(png)
}
/// Write `bytes` to `path` through a hidden temporary file in the same directory.
/// The temporary file is deleted when any step fails.
pub fn write_png(path: &Path, bytes: &[u8]) -> Result<(), GraphError> {
    check_output_format(path)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| GraphError::RenderFailure(format!("{} has no file name", path.display())))?;
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    let prefix = format!(".{}.", file_name.to_string_lossy());
    let mut partial = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".partial")
        .tempfile_in(dir)?;
    partial.write_all(bytes)?;
    partial.as_file().sync_all()?;
    debug!("moving {} into place", partial.path().display());
    partial.persist(path).map_err(|e| e.error)?;
    Ok(())
}
