use super::Config;

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_var("SMTP_HOST") {
            self.smtp.host = host;
        }

        if let Some(port_str) = non_empty_var("SMTP_PORT")
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.smtp.port = port;
        }

        if let Some(user) = non_empty_var("SMTP_USER") {
            self.smtp.user = Some(user);
        }

        if let Some(pass) = non_empty_var("SMTP_PASS") {
            self.smtp.pass = Some(pass);
        }

        if let Some(recipient) = non_empty_var("ADOPTION_EMAIL") {
            self.smtp.recipient = recipient;
        }

        if let Some(port_str) =
            non_empty_var("ADOPTAR_GATEWAY_PORT").or_else(|| non_empty_var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(host) =
            non_empty_var("ADOPTAR_GATEWAY_HOST").or_else(|| non_empty_var("HOST"))
        {
            self.gateway.host = host;
        }

        if let Some(size) = non_empty_var("ADOPTAR_MAX_FILE_SIZE")
            && let Ok(size) = size.parse::<u64>()
        {
            self.limits.max_file_size = size;
        }

        if let Some(size) = non_empty_var("ADOPTAR_MAX_TOTAL_SIZE")
            && let Ok(size) = size.parse::<u64>()
        {
            self.limits.max_total_size = size;
        }

        if let Some(count) = non_empty_var("ADOPTAR_MAX_FILES")
            && let Ok(count) = count.parse::<usize>()
        {
            self.limits.max_files = count;
        }

        if let Some(endpoint) = non_empty_var("ADOPTAR_ENDPOINT") {
            self.client.endpoint = endpoint;
        }
    }
}
