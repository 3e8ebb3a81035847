//! TypeScript type generation for the front end.
//!
//! Compiled only under test: running the test writes one `.ts` file per
//! exported type into the output directory.

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use ts_rs::TS;

    #[test]
    fn generate_typescript_types() {
        // CONTACTFLOW_TS_OUTPUT_DIR wins, then the front-end tree if present,
        // then ../ts-bindings.
        let output_dir_str = if let Ok(env_dir) = env::var("CONTACTFLOW_TS_OUTPUT_DIR") {
            println!("Using TypeScript output directory from CONTACTFLOW_TS_OUTPUT_DIR: {}", env_dir);
            env_dir
        } else {
            let web_dir = "../../web/src/types/generated";
            let fallback_dir = "../ts-bindings";

            if Path::new(web_dir).parent().unwrap_or(Path::new("")).exists() {
                println!("Using front-end directory: {}", web_dir);
                web_dir.to_string()
            } else {
                println!("Using fallback directory: {}", fallback_dir);
                fallback_dir.to_string()
            }
        };

        let output_dir = Path::new(&output_dir_str);
        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
        }

        // Stale definitions for renamed or removed types go first.
        for entry in std::fs::read_dir(output_dir).expect("Failed to read output directory") {
            let path = entry.expect("Failed to read directory entry").path();
            if path.extension().and_then(|s| s.to_str()) == Some("ts") {
                std::fs::remove_file(&path)
                    .unwrap_or_else(|e| panic!("Failed to remove {:?}: {}", path, e));
            }
        }

        unsafe {
            env::set_var("TS_RS_EXPORT_DIR", output_dir);
        }

        use crate::api::{
            ErrorResponse, TimeRemainingResponse,
            contact_form::{PublicSessionResponse, SubmitContactRequest, UnlockRequest},
            login::{LoginRequest, LoginSuccessResponse},
            session::{CreateSessionRequest, SessionResponse},
            signup::SignupRequest,
            status::HealthStatus,
        };
        use crate::models::{Contact, GlobalContact, User};

        User::export().expect("Failed to export User type");
        Contact::export().expect("Failed to export Contact type");
        GlobalContact::export().expect("Failed to export GlobalContact type");

        ErrorResponse::export().expect("Failed to export ErrorResponse type");
        TimeRemainingResponse::export().expect("Failed to export TimeRemainingResponse type");
        HealthStatus::export().expect("Failed to export HealthStatus type");

        LoginRequest::export().expect("Failed to export LoginRequest type");
        LoginSuccessResponse::export().expect("Failed to export LoginSuccessResponse type");
        SignupRequest::export().expect("Failed to export SignupRequest type");

        CreateSessionRequest::export().expect("Failed to export CreateSessionRequest type");
        SessionResponse::export().expect("Failed to export SessionResponse type");

        PublicSessionResponse::export().expect("Failed to export PublicSessionResponse type");
        UnlockRequest::export().expect("Failed to export UnlockRequest type");
        SubmitContactRequest::export().expect("Failed to export SubmitContactRequest type");

        println!("TypeScript types generated successfully in {:?}", output_dir);
    }
}
