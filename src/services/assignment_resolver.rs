//! Resolución de la tripulación efectiva
//!
//! Para un schedule y una fecha determina quién conduce (y quién acompaña)
//! teniendo en cuenta las sustituciones vigentes. Si varias sustituciones se
//! solapan en la misma fecha gana la de `start_date` más reciente; el solape se
//! devuelve como aviso y nunca interrumpe la generación.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::models::crew::CrewRole;
use crate::models::driver_assignment::DriverAssignment;
use crate::models::schedule::Schedule;

/// Origen de la persona resuelta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "assignment_id", rename_all = "snake_case")]
pub enum AssignmentSource {
    Default,
    Override(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub id: Uuid,
    pub source: AssignmentSource,
}

/// Varias sustituciones vigentes el mismo día para el mismo rol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapWarning {
    pub schedule_id: Uuid,
    pub role: CrewRole,
    pub date: NaiveDate,
    pub chosen: Uuid,
    pub ignored: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewResolution {
    pub driver: Resolved,
    pub attendant: Option<Resolved>,
    pub warnings: Vec<OverlapWarning>,
}

struct RoleResolution {
    resolved: Option<Resolved>,
    warning: Option<OverlapWarning>,
}

fn resolve_role(
    schedule: &Schedule,
    role: CrewRole,
    default: Option<Uuid>,
    date: NaiveDate,
    overrides: &[DriverAssignment],
) -> RoleResolution {
    let mut matching: Vec<&DriverAssignment> = overrides
        .iter()
        .filter(|a| a.schedule_id == schedule.id && a.role == role && a.is_active_on(date))
        .collect();

    // Más reciente primero; created_at e id solo desempatan
    matching.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });

    let Some((chosen, rest)) = matching.split_first() else {
        return RoleResolution {
            resolved: default.map(|id| Resolved {
                id,
                source: AssignmentSource::Default,
            }),
            warning: None,
        };
    };

    let warning = (!rest.is_empty()).then(|| {
        let warning = OverlapWarning {
            schedule_id: schedule.id,
            role,
            date,
            chosen: chosen.id,
            ignored: rest.iter().map(|a| a.id).collect(),
        };
        warn!(
            "⚠️ {} sustituciones de {} solapadas para schedule {} el {}; se usa {}",
            rest.len() + 1,
            role,
            schedule.id,
            date,
            chosen.id
        );
        warning
    });

    RoleResolution {
        resolved: Some(Resolved {
            id: chosen.substitute_id,
            source: AssignmentSource::Override(chosen.id),
        }),
        warning,
    }
}

/// Conductor efectivo de `schedule` en `date`
pub fn resolve_driver(schedule: &Schedule, date: NaiveDate, overrides: &[DriverAssignment]) -> Resolved {
    let resolution = resolve_role(
        schedule,
        CrewRole::Driver,
        Some(schedule.default_driver_id),
        date,
        overrides,
    );
    resolution.resolved.unwrap_or(Resolved {
        id: schedule.default_driver_id,
        source: AssignmentSource::Default,
    })
}

/// Conductor y acompañante efectivos, con los avisos de solape encontrados
pub fn resolve_crew(schedule: &Schedule, date: NaiveDate, overrides: &[DriverAssignment]) -> CrewResolution {
    let driver = resolve_role(
        schedule,
        CrewRole::Driver,
        Some(schedule.default_driver_id),
        date,
        overrides,
    );
    let attendant = resolve_role(
        schedule,
        CrewRole::Attendant,
        schedule.default_attendant_id,
        date,
        overrides,
    );

    CrewResolution {
        driver: driver.resolved.unwrap_or(Resolved {
            id: schedule.default_driver_id,
            source: AssignmentSource::Default,
        }),
        attendant: attendant.resolved,
        warnings: driver.warning.into_iter().chain(attendant.warning).collect(),
    }
}
