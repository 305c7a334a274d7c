// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Control de Prácticas API"),
    paths(
        // --- Sistema ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::first_admin,
        handlers::auth::register_student,
        handlers::auth::create_admin,
        handlers::auth::logout,
        handlers::auth::profile,

        // --- Administração ---
        handlers::dashboard::admin_dashboard,
        handlers::auth::change_password,

        // --- Universidades ---
        handlers::universities::list_universities,
        handlers::universities::get_university,
        handlers::universities::create_university,
        handlers::universities::update_university,
        handlers::universities::toggle_university,
        handlers::universities::delete_university,

        // --- Períodos ---
        handlers::periods::list_periods,
        handlers::periods::get_period,
        handlers::periods::create_period,
        handlers::periods::update_period,
        handlers::periods::toggle_period,
        handlers::periods::delete_period,
        handlers::periods::expire_periods,
        handlers::periods::bulk_enroll,
        handlers::periods::period_summary,

        // --- Estudantes (admin) ---
        handlers::students::list_students,
        handlers::students::get_student,
        handlers::students::create_student,
        handlers::students::update_student,
        handlers::students::toggle_student,
        handlers::students::reset_student_password,
        handlers::students::delete_student,
        handlers::students::student_statistics,

        // --- Área do estudante ---
        handlers::hour_logs::my_profile,
        handlers::hour_logs::my_dashboard,
        handlers::hour_logs::log_hours,
        handlers::hour_logs::my_logs,
        handlers::hour_logs::get_my_log,
        handlers::hour_logs::update_my_log,
        handlers::hour_logs::delete_my_log,
        handlers::hour_logs::my_statistics,
        handlers::hour_logs::export_my_logs,
        handlers::hour_logs::add_evidence,
        handlers::hour_logs::list_evidence,
        handlers::hour_logs::review_log,

        // --- Tipos de atividade ---
        handlers::activity::list_all_types,
        handlers::activity::list_active_types,
        handlers::activity::create_type,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::update_lead,

        // --- Auditoria ---
        handlers::audit::list_audit,
        handlers::audit::log_manual_action,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::Administrador,
            models::auth::AdminContext,
            models::auth::StudentContext,
            models::auth::LoginPayload,
            models::auth::CreateAdminPayload,
            models::auth::RegisterStudentPayload,
            models::auth::ChangePasswordPayload,

            // --- Catálogos ---
            models::university::Universidad,
            models::university::CreateUniversidadPayload,
            models::university::UpdateUniversidadPayload,
            models::period::Periodo,
            models::period::CreatePeriodoPayload,
            models::period::UpdatePeriodoPayload,

            // --- Estudantes e matrículas ---
            models::student::Estudiante,
            models::student::CreateEstudiantePayload,
            models::student::UpdateEstudiantePayload,
            models::student::ResetPasswordPayload,
            models::enrollment::Matriculacion,
            models::enrollment::EnrollmentOutcome,
            models::enrollment::MatriculaMasivaPayload,
            models::enrollment::MatriculaMasivaResultado,

            // --- Registros de horas ---
            models::hour_log::RegistroHora,
            models::hour_log::EstadoRegistro,
            models::hour_log::CreateRegistroPayload,
            models::hour_log::UpdateRegistroPayload,
            models::hour_log::RevisarRegistroPayload,
            models::activity::TipoActividad,
            models::activity::CreateTipoActividadPayload,
            models::activity::Evidencia,
            models::activity::CreateEvidenciaPayload,

            // --- Leads e auditoria ---
            models::lead::SolicitudDemo,
            models::lead::LeadStatus,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::audit::ManualAuditPayload,
        )
    ),
    tags(
        (name = "Sistema", description = "Estado del servicio"),
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Administración", description = "Panel y cuenta del administrador"),
        (name = "Universidades", description = "Gestión de universidades"),
        (name = "Periodos", description = "Periodos de práctica y matrículas"),
        (name = "Estudiantes", description = "Gestión de estudiantes"),
        (name = "Estudiante", description = "Área del estudiante: horas, estadísticas y evidencias"),
        (name = "Registros", description = "Revisión de registros de horas"),
        (name = "Tipos de actividad", description = "Catálogo de actividades"),
        (name = "Leads", description = "Solicitudes de demostración"),
        (name = "Público", description = "Captura pública de solicitudes"),
        (name = "Auditoría", description = "Registro de acciones del sistema")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_versioned_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/v1/estudiante/registrar-horas"));
        assert!(doc.paths.paths.contains_key("/api/v1/admin/periodos/{id}/matricula-masiva"));
        let has_jwt = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("api_jwt"));
        assert!(has_jwt);
    }
}
