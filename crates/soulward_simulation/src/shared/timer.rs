//! Таймеры симуляции
//!
//! Все ожидания в симуляции — polling таймеров на каждом тике.
//! 300 тиков по 1/60 в f32 дают не ровно 5.0, поэтому сравнение
//! идёт с допуском `TIMER_EPSILON`.

/// Допуск на накопленную ошибку суммирования dt
pub const TIMER_EPSILON: f32 = 1e-4;

/// Отбрасывает мусорный dt (NaN, inf, отрицательный)
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Обратный отсчёт до нуля (clamp в 0).
///
/// Возвращает `true` только на том тике, где таймер дошёл до нуля.
pub fn count_down(remaining: &mut f32, dt: f32) -> bool {
    if *remaining <= 0.0 {
        *remaining = 0.0;
        return false;
    }

    *remaining -= sanitize_dt(dt);
    if *remaining <= TIMER_EPSILON {
        *remaining = 0.0;
        return true;
    }
    false
}

/// Прямой отсчёт: `true` когда накоплено не меньше `limit`
pub fn count_up(elapsed: &mut f32, dt: f32, limit: f32) -> bool {
    *elapsed += sanitize_dt(dt);
    *elapsed + TIMER_EPSILON >= limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_up_rest_window() {
        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;

        for tick in 1..300 {
            assert!(!count_up(&mut elapsed, dt, 5.0), "ended early on tick {}", tick);
        }
        assert!(count_up(&mut elapsed, dt, 5.0));
    }

    #[test]
    fn test_count_down_clamps_and_fires_once() {
        let mut remaining = 0.05;
        assert!(!count_down(&mut remaining, 0.02));
        assert!(!count_down(&mut remaining, 0.02));
        assert!(count_down(&mut remaining, 0.02));
        assert_eq!(remaining, 0.0);

        // уже на нуле — больше не срабатывает
        assert!(!count_down(&mut remaining, 0.02));
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn test_garbage_dt_ignored() {
        let mut remaining = 1.0;
        count_down(&mut remaining, f32::NAN);
        count_down(&mut remaining, -3.0);
        assert_eq!(remaining, 1.0);
    }
}
