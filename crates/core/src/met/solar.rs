//! Solar geometry: cosine of the solar zenith angle, sunrise and sunset.

/// Solar position for a fixed latitude and day of year. `update` refreshes
/// the zenith cosine as simulated time advances; sunrise/sunset are local
/// solar hours computed once at construction.
#[derive(Debug, Clone)]
pub struct SolarZenith {
    latitude_rad: f64,
    declination_rad: f64,
    /// Local solar hour of sunrise [h].
    pub sunrise_h: f64,
    /// Local solar hour of sunset [h].
    pub sunset_h: f64,
    /// Largest attainable zenith cosine for this day/latitude.
    pub csza_max: f64,
    /// Current cosine of the solar zenith angle, clamped at 0 after dark.
    pub csza: f64,
}

impl SolarZenith {
    #[must_use]
    pub fn new(latitude_deg: f64, day_of_year: u32) -> Self {
        let latitude_rad = latitude_deg.to_radians();
        // Spencer-style approximation of the solar declination.
        let declination_rad =
            -23.44_f64.to_radians() * ((2.0 * std::f64::consts::PI / 365.0)
                * (day_of_year as f64 + 10.0))
                .cos();
        // Hour angle at sunrise: cos H0 = -tan(lat) tan(decl). Clamped for
        // polar day/night.
        let cos_h0 = (-latitude_rad.tan() * declination_rad.tan()).clamp(-1.0, 1.0);
        let h0 = cos_h0.acos(); // radians
        let half_day_h = h0 * 12.0 / std::f64::consts::PI;
        let sunrise_h = 12.0 - half_day_h;
        let sunset_h = 12.0 + half_day_h;
        let csza_max = (latitude_rad.sin() * declination_rad.sin()
            + latitude_rad.cos() * declination_rad.cos())
        .max(0.0);
        let mut sun = Self {
            latitude_rad,
            declination_rad,
            sunrise_h,
            sunset_h,
            csza_max,
            csza: 0.0,
        };
        sun.update(0.0);
        sun
    }

    /// Refresh the zenith cosine for `time_s` seconds since local midnight.
    pub fn update(&mut self, time_s: f64) {
        let hour = (time_s / 3600.0).rem_euclid(24.0);
        let hour_angle = (hour - 12.0) * std::f64::consts::PI / 12.0;
        let csza = self.latitude_rad.sin() * self.declination_rad.sin()
            + self.latitude_rad.cos() * self.declination_rad.cos() * hour_angle.cos();
        self.csza = csza.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noon_is_brightest() {
        let mut sun = SolarZenith::new(60.0, 81);
        sun.update(12.0 * 3600.0);
        let noon = sun.csza;
        sun.update(8.0 * 3600.0);
        assert!(noon > sun.csza);
        assert!((noon - sun.csza_max).abs() < 1e-6);
    }

    #[test]
    fn dark_before_sunrise() {
        let mut sun = SolarZenith::new(60.0, 81);
        let before = (sun.sunrise_h - 0.5) * 3600.0;
        sun.update(before);
        assert_eq!(sun.csza, 0.0);
        let after = (sun.sunrise_h + 0.5) * 3600.0;
        sun.update(after);
        assert!(sun.csza > 0.0);
    }

    #[test]
    fn sunrise_and_sunset_bracket_noon_symmetrically() {
        let sun = SolarZenith::new(45.0, 120);
        assert!(sun.sunrise_h < 12.0 && 12.0 < sun.sunset_h);
        assert!((12.0 - sun.sunrise_h - (sun.sunset_h - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn csza_vanishes_at_sunrise() {
        let mut sun = SolarZenith::new(60.0, 81);
        sun.update(sun.sunrise_h * 3600.0);
        assert!(sun.csza.abs() < 1e-6, "csza at sunrise: {}", sun.csza);
    }
}
