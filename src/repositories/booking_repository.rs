use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{BookingRepository, PgRepository};
use crate::models::{Booking, BookingEvent, BookingFilter, DamageReport};
use crate::services::availability_service::is_vehicle_free;
use crate::utils::errors::{map_constraint_violation, not_found_error, AppError, AppResult};

/// Bloquea la fila del vehículo hasta el commit
async fn lock_vehicle(tx: &mut Transaction<'_, Postgres>, vehicle_id: Uuid) -> AppResult<()> {
    let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM vehicles WHERE id = $1 FOR UPDATE")
        .bind(vehicle_id)
        .fetch_optional(&mut **tx)
        .await?;

    locked
        .map(|_| ())
        .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))
}

async fn lock_booking(tx: &mut Transaction<'_, Postgres>, booking_id: Uuid) -> AppResult<Booking> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))
}

async fn vehicle_bookings(tx: &mut Transaction<'_, Postgres>, vehicle_id: Uuid) -> AppResult<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE vehicle_id = $1")
        .bind(vehicle_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(bookings)
}

#[async_trait]
impl BookingRepository for PgRepository {
    async fn bookings_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE vehicle_id = $1 ORDER BY ordered_at DESC, id ASC",
        )
        .bind(vehicle_id)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    async fn active_vehicle_ids(&self) -> AppResult<HashSet<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT DISTINCT vehicle_id FROM bookings WHERE status IN ('pending', 'confirmed', 'in_use')",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(booking)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            JOIN vehicles v ON v.id = b.vehicle_id
            WHERE ($1::uuid IS NULL OR b.user_id = $1)
              AND ($2::uuid IS NULL OR v.owner_id = $2)
            ORDER BY b.ordered_at DESC, b.id ASC
            "#,
        )
        .bind(filter.by_user)
        .bind(filter.by_owner)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    async fn insert_booking_exclusive(&self, booking: Booking) -> AppResult<Booking> {
        let mut tx = self.pool().begin().await?;

        lock_vehicle(&mut tx, booking.vehicle_id).await?;
        let existing = vehicle_bookings(&mut tx, booking.vehicle_id).await?;
        if !is_vehicle_free(&existing, None) {
            return Err(AppError::VehicleUnavailable(booking.vehicle_id));
        }

        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, vehicle_id, user_id, start_time, end_time, total_price, security_deposit, status, ordered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.vehicle_id)
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.total_price)
        .bind(booking.security_deposit)
        .bind(booking.status)
        .bind(booking.ordered_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, booking.vehicle_id, None))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn reschedule_booking_exclusive(
        &self,
        booking_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        total_price: Decimal,
    ) -> AppResult<Booking> {
        let mut tx = self.pool().begin().await?;

        // Mismo orden que el borrado en cascada: primero el vehículo, luego la reserva
        let (vehicle_id,): (Uuid,) = sqlx::query_as("SELECT vehicle_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;
        lock_vehicle(&mut tx, vehicle_id).await?;
        let current = lock_booking(&mut tx, booking_id).await?;

        if !current.status.is_reschedulable() {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot reschedule a {} booking",
                current.status.as_str()
            )));
        }

        let existing = vehicle_bookings(&mut tx, current.vehicle_id).await?;
        if !is_vehicle_free(&existing, Some(booking_id)) {
            return Err(AppError::VehicleUnavailable(current.vehicle_id));
        }

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET start_time = $2, end_time = $3, total_price = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(start_time)
        .bind(end_time)
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn apply_booking_event(&self, booking_id: Uuid, event: BookingEvent) -> AppResult<Booking> {
        let mut tx = self.pool().begin().await?;

        let current = lock_booking(&mut tx, booking_id).await?;
        let next = current.status.apply(event)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn settle_booking(
        &self,
        booking_id: Uuid,
        report: DamageReport,
    ) -> AppResult<(Booking, DamageReport)> {
        let mut tx = self.pool().begin().await?;

        let current = lock_booking(&mut tx, booking_id).await?;
        let next = current.status.apply(BookingEvent::Return)?;

        let (report_exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM damage_reports WHERE booking_id = $1)",
        )
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;
        if report_exists {
            return Err(AppError::DuplicateReport(booking_id));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        let report = sqlx::query_as::<_, DamageReport>(
            r#"
            INSERT INTO damage_reports (id, booking_id, damage_description, damage_cost, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(report.id)
        .bind(booking_id)
        .bind(&report.damage_description)
        .bind(report.damage_cost)
        .bind(&report.image)
        .bind(report.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, booking_id, None))?;

        // Si algo falla antes de aquí, la transacción se descarta completa
        tx.commit().await?;
        Ok((booking, report))
    }

    async fn find_damage_report(&self, booking_id: Uuid) -> AppResult<Option<DamageReport>> {
        let report = sqlx::query_as::<_, DamageReport>(
            "SELECT * FROM damage_reports WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(report)
    }
}
