use crate::config::RulerConfig;

/// Factor that fits an image into the screen area left of the control panel,
/// shrunk by the configured margin. `None` for an empty image or a
/// non-finite result.
pub fn fit_scale(image_size: [u32; 2], screen_size: [f32; 2], config: &RulerConfig) -> Option<f32> {
    let [width, height] = image_size;
    if width == 0 || height == 0 {
        return None;
    }
    let viewport_width = (screen_size[0] - config.reserved_panel_width).max(0.0);
    let viewport_height = screen_size[1].max(0.0);

    let w_ratio = viewport_width / width as f32;
    let h_ratio = viewport_height / height as f32;
    let scale = w_ratio.min(h_ratio) * config.fit_margin;

    (scale.is_finite() && scale >= 0.0).then_some(scale)
}

/// Image size after scaling, at least one pixel per side.
pub fn display_size(image_size: [u32; 2], scale: f32) -> [u32; 2] {
    image_size.map(|side| ((side as f32 * scale).round() as u32).max(1))
}

/// Resampling factor for the display texture: the point scale times the
/// screen's pixels per point, capped so neither side exceeds `max_texture_side`.
pub fn texture_scale(image_size: [u32; 2], scale: f32, pixels_per_point: f32, max_texture_side: u32) -> f32 {
    let texel_scale = scale * pixels_per_point;
    let longest = image_size[0].max(image_size[1]) as f32;
    if longest == 0.0 {
        return texel_scale;
    }
    texel_scale.min(max_texture_side as f32 / longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn landscape_photo_on_full_hd() {
        let scale = fit_scale([4000, 3000], [1920.0, 1080.0], &RulerConfig::default()).unwrap();
        // min(1520/4000, 1080/3000) * 0.9
        assert_relative_eq!(scale, 0.324, epsilon = 1e-6);
        assert_eq!(display_size([4000, 3000], scale), [1296, 972]);
    }

    #[test]
    fn width_bound_image() {
        let scale = fit_scale([3040, 100], [1920.0, 1080.0], &RulerConfig::default()).unwrap();
        assert_relative_eq!(scale, 0.5 * 0.9, epsilon = 1e-6);
    }

    #[test]
    fn small_image_is_enlarged() {
        let scale = fit_scale([152, 108], [1920.0, 1080.0], &RulerConfig::default()).unwrap();
        assert_relative_eq!(scale, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn empty_image_has_no_scale() {
        let config = RulerConfig::default();
        assert_eq!(fit_scale([0, 300], [1920.0, 1080.0], &config), None);
        assert_eq!(fit_scale([300, 0], [1920.0, 1080.0], &config), None);
    }

    #[test]
    fn narrow_screen_never_goes_negative() {
        let scale = fit_scale([800, 600], [300.0, 1080.0], &RulerConfig::default()).unwrap();
        assert_eq!(scale, 0.0);
        assert_eq!(display_size([800, 600], scale), [1, 1]);
    }

    #[test]
    fn custom_panel_and_margin() {
        let config = RulerConfig {
            reserved_panel_width: 0.0,
            fit_margin: 1.0,
            ..RulerConfig::default()
        };
        let scale = fit_scale([1000, 500], [2000.0, 2000.0], &config).unwrap();
        assert_relative_eq!(scale, 2.0);
    }

    #[test]
    fn texture_follows_pixels_per_point() {
        let factor = texture_scale([400, 300], 3.24, 1.5, 2048);
        assert_relative_eq!(factor, 4.86, epsilon = 1e-5);
        assert_eq!(display_size([400, 300], factor), [1944, 1458]);
        assert_relative_eq!(texture_scale([400, 300], 3.24, 1.0, 2048), 3.24);
    }

    #[test]
    fn texture_is_capped_at_max_side() {
        let factor = texture_scale([4000, 3000], 0.324, 2.0, 1024);
        assert_relative_eq!(factor, 0.256, epsilon = 1e-6);
        assert_eq!(display_size([4000, 3000], factor), [1024, 768]);
    }
}
