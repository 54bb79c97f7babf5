//! 表单校验
//!
//! 纯函数：把表单原始输入转换为请求体，失败时返回逐字段的错误消息。
//! 校验失败的表单从不发送请求。

use std::collections::BTreeMap;

use donamatch_shared::date::parse_date_input;
use donamatch_shared::{
    Donation, DonationPatch, DonationRequest, Identity, LoginRequest, RegisterRequest,
    UpdateProfileRequest,
};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email ou senha inválidos";
pub const PASSWORD_CHANGE_UNAVAILABLE: &str =
    "Funcionalidade de alteração de senha em desenvolvimento";

// =========================================================
// FieldErrors
// =========================================================

/// 逐字段的错误消息，每个字段只保留第一条
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

// =========================================================
// 规则
// =========================================================

fn required(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{} é obrigatório", label));
        false
    } else {
        true
    }
}

fn min_chars(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.add(
            field,
            format!("{} deve ter pelo menos {} caracteres", label, min),
        );
    }
}

fn max_chars(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        errors.add(
            field,
            format!("{} deve ter no máximo {} caracteres", label, max),
        );
    }
}

fn email(errors: &mut FieldErrors, value: &str) {
    if required(errors, "email", "Email", value) && !is_valid_email(value.trim()) {
        errors.add("email", "Email inválido");
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// `(dd) dddd-dddd` 或 `(dd) ddddd-dddd`
pub fn is_valid_phone(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('(') else {
        return false;
    };
    let Some((area, rest)) = rest.split_once(") ") else {
        return false;
    };
    let Some((prefix, line)) = rest.split_once('-') else {
        return false;
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    area.len() == 2
        && digits(area)
        && (4..=5).contains(&prefix.len())
        && digits(prefix)
        && line.len() == 4
        && digits(line)
}

/// 输入时的电话掩码，最多保留 11 位数字
pub fn format_phone(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(11).collect();
    let n = digits.len();
    match n {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => digits,
    }
}

/// 去掉首尾空白，空串视为未填写
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =========================================================
// 登录 / 注册
// =========================================================

pub fn validate_login(email_input: &str, password: &str) -> Result<LoginRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    email(&mut errors, email_input);
    required(&mut errors, "password", "Senha", password);
    errors.into_result(LoginRequest {
        email: email_input.trim().to_string(),
        password: password.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub bio: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        if required(&mut errors, "name", "Nome", &self.name) {
            min_chars(&mut errors, "name", "Nome", &self.name, 2);
        }
        email(&mut errors, &self.email);
        if required(&mut errors, "password", "Senha", &self.password) {
            min_chars(&mut errors, "password", "Senha", &self.password, 6);
        }

        errors.into_result(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: optional_text(&self.phone),
            address: optional_text(&self.address),
            city: optional_text(&self.city),
            state: optional_text(&self.state),
            zip_code: optional_text(&self.zip_code),
            bio: optional_text(&self.bio),
        })
    }
}

// =========================================================
// 发布捐赠
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DonationForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    /// 数量输入框的原始内容
    pub quantity: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub pickup_instructions: String,
    /// `<input type="date">` 的值
    pub expires_at: String,
}

impl Default for DonationForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: String::new(),
            condition: String::new(),
            quantity: "1".to_string(),
            location: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            pickup_instructions: String::new(),
            expires_at: String::new(),
        }
    }
}

impl DonationForm {
    pub fn to_request(&self) -> Result<DonationRequest, FieldErrors> {
        let mut errors = FieldErrors::default();

        if required(&mut errors, "title", "Título", &self.title) {
            min_chars(&mut errors, "title", "Título", &self.title, 5);
            max_chars(&mut errors, "title", "Título", &self.title, 200);
        }
        if required(&mut errors, "description", "Descrição", &self.description) {
            min_chars(&mut errors, "description", "Descrição", &self.description, 10);
        }
        required(&mut errors, "category", "Categoria", &self.category);

        let quantity = if required(&mut errors, "quantity", "Quantidade", &self.quantity) {
            match self.quantity.trim().parse::<u32>() {
                Ok(q) if q >= 1 => q,
                _ => {
                    errors.add("quantity", "Quantidade deve ser pelo menos 1");
                    0
                }
            }
        } else {
            0
        };

        let expires_at = match optional_text(&self.expires_at) {
            Some(raw) => {
                let parsed = parse_date_input(&raw);
                if parsed.is_none() {
                    errors.add("expiresAt", "Data inválida");
                }
                parsed
            }
            None => None,
        };

        errors.into_result(DonationRequest {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone(),
            condition: optional_text(&self.condition),
            quantity,
            location: optional_text(&self.location),
            city: optional_text(&self.city),
            state: optional_text(&self.state),
            zip_code: optional_text(&self.zip_code),
            image_urls: None,
            pickup_instructions: optional_text(&self.pickup_instructions),
            expires_at,
        })
    }
}

/// 面板中的快速编辑，只提交改动过的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationEditForm {
    pub title: String,
    pub description: String,
    pub quantity: String,
    original: DonationPatch,
}

impl DonationEditForm {
    pub fn from_donation(donation: &Donation) -> Self {
        Self {
            title: donation.title.clone(),
            description: donation.description.clone(),
            quantity: donation.quantity.to_string(),
            original: DonationPatch {
                title: Some(donation.title.clone()),
                description: Some(donation.description.clone()),
                quantity: Some(donation.quantity),
                ..Default::default()
            },
        }
    }

    pub fn to_patch(&self) -> Result<DonationPatch, FieldErrors> {
        let mut errors = FieldErrors::default();
        if required(&mut errors, "title", "Título", &self.title) {
            min_chars(&mut errors, "title", "Título", &self.title, 5);
            max_chars(&mut errors, "title", "Título", &self.title, 200);
        }
        if required(&mut errors, "description", "Descrição", &self.description) {
            min_chars(&mut errors, "description", "Descrição", &self.description, 10);
        }
        let quantity = match self.quantity.trim().parse::<u32>() {
            Ok(q) if q >= 1 => Some(q),
            _ => {
                errors.add("quantity", "Quantidade deve ser pelo menos 1");
                None
            }
        };

        let changed = |value: Option<String>, before: &Option<String>| {
            value.filter(|v| Some(v) != before.as_ref())
        };
        errors.into_result(DonationPatch {
            title: changed(optional_text(&self.title), &self.original.title),
            description: changed(optional_text(&self.description), &self.original.description),
            quantity: quantity.filter(|q| Some(*q) != self.original.quantity),
            ..Default::default()
        })
    }
}

// =========================================================
// 个人资料
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

impl ProfileForm {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.clone(),
            phone: identity.phone.clone().unwrap_or_default(),
            address: identity.address.clone().unwrap_or_default(),
            city: identity.city.clone().unwrap_or_default(),
            state: identity.state.clone().unwrap_or_default(),
        }
    }

    pub fn to_request(&self) -> Result<UpdateProfileRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        if required(&mut errors, "name", "Nome", &self.name) {
            min_chars(&mut errors, "name", "Nome", &self.name, 2);
        }
        email(&mut errors, &self.email);
        if required(&mut errors, "phone", "Telefone", &self.phone)
            && !is_valid_phone(self.phone.trim())
        {
            errors.add("phone", "Telefone deve estar no formato (11) 99999-9999");
        }
        required(&mut errors, "address", "Endereço", &self.address);
        required(&mut errors, "city", "Cidade", &self.city);
        required(&mut errors, "state", "Estado", &self.state);

        errors.into_result(UpdateProfileRequest {
            name: optional_text(&self.name),
            email: optional_text(&self.email),
            phone: optional_text(&self.phone),
            address: optional_text(&self.address),
            city: optional_text(&self.city),
            state: optional_text(&self.state),
            ..Default::default()
        })
    }
}

/// 修改密码表单（后端暂无对应端点，只做本地校验）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "currentPassword", "Senha atual", &self.current);
        if required(&mut errors, "newPassword", "Nova senha", &self.new) {
            min_chars(&mut errors, "newPassword", "Nova senha", &self.new, 6);
        }
        if required(&mut errors, "confirmPassword", "Confirmação", &self.confirm)
            && self.confirm != self.new
        {
            errors.add("confirmPassword", "As senhas não coincidem");
        }
        errors.into_result(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_donation() -> DonationForm {
        DonationForm {
            title: "Mesa de jantar".to_string(),
            description: "Mesa de madeira com quatro cadeiras".to_string(),
            category: "Móveis".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn login_requires_email_and_password() {
        let errors = validate_login("", "").unwrap_err();
        assert_eq!(errors.get("email"), Some("Email é obrigatório"));
        assert_eq!(errors.get("password"), Some("Senha é obrigatório"));

        let errors = validate_login("maria", "x").unwrap_err();
        assert_eq!(errors.get("email"), Some("Email inválido"));

        let req = validate_login(" maria@example.com ", "x").unwrap();
        assert_eq!(req.email, "maria@example.com");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b"));
        assert!(is_valid_email("maria.silva@example.com.br"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("maria@"));
        assert!(!is_valid_email("ma ria@example.com"));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn register_enforces_lengths_and_drops_blank_optionals() {
        let form = RegisterForm {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            password: "123".to_string(),
            ..Default::default()
        };
        let errors = form.to_request().unwrap_err();
        assert_eq!(errors.get("name"), Some("Nome deve ter pelo menos 2 caracteres"));
        assert_eq!(errors.get("password"), Some("Senha deve ter pelo menos 6 caracteres"));

        let form = RegisterForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "123456".to_string(),
            city: "  ".to_string(),
            state: "PE".to_string(),
            ..Default::default()
        };
        let req = form.to_request().unwrap();
        assert_eq!(req.city, None);
        assert_eq!(req.state.as_deref(), Some("PE"));
    }

    #[test]
    fn donation_form_bounds() {
        assert!(valid_donation().to_request().is_ok());

        let mut form = valid_donation();
        form.title = "Mesa".to_string();
        assert_eq!(
            form.to_request().unwrap_err().get("title"),
            Some("Título deve ter pelo menos 5 caracteres")
        );

        form.title = "x".repeat(201);
        assert_eq!(
            form.to_request().unwrap_err().get("title"),
            Some("Título deve ter no máximo 200 caracteres")
        );

        let mut form = valid_donation();
        form.description = "curta".to_string();
        form.category.clear();
        let errors = form.to_request().unwrap_err();
        assert_eq!(
            errors.get("description"),
            Some("Descrição deve ter pelo menos 10 caracteres")
        );
        assert_eq!(errors.get("category"), Some("Categoria é obrigatório"));
    }

    #[test]
    fn donation_quantity_must_be_positive() {
        for bad in ["0", "-1", "abc"] {
            let mut form = valid_donation();
            form.quantity = bad.to_string();
            assert_eq!(
                form.to_request().unwrap_err().get("quantity"),
                Some("Quantidade deve ser pelo menos 1"),
                "quantity {:?}",
                bad
            );
        }
        let mut form = valid_donation();
        form.quantity = "3".to_string();
        assert_eq!(form.to_request().unwrap().quantity, 3);
    }

    #[test]
    fn donation_expiry_is_end_of_day() {
        let mut form = valid_donation();
        form.expires_at = "2025-01-31".to_string();
        let req = form.to_request().unwrap();
        assert_eq!(
            req.expires_at.map(|d| d.to_string()).as_deref(),
            Some("2025-01-31 23:59:59")
        );

        form.expires_at = "31/01/2025".to_string();
        assert!(form.to_request().unwrap_err().get("expiresAt").is_some());
    }

    #[test]
    fn phone_mask_follows_digit_count() {
        assert_eq!(format_phone("8"), "8");
        assert_eq!(format_phone("81"), "81");
        assert_eq!(format_phone("819"), "(81) 9");
        assert_eq!(format_phone("8199"), "(81) 99");
        assert_eq!(format_phone("819999"), "(81) 9999");
        assert_eq!(format_phone("8199998"), "(81) 9999-8");
        assert_eq!(format_phone("8199998888"), "(81) 9999-8888");
        assert_eq!(format_phone("81999998888"), "(81) 99999-8888");
        assert_eq!(format_phone("(81) 99999-88881"), "(81) 99999-8888");
    }

    #[test]
    fn phone_pattern() {
        assert!(is_valid_phone("(81) 9999-8888"));
        assert!(is_valid_phone("(81) 99999-8888"));
        assert!(!is_valid_phone("81 99999-8888"));
        assert!(!is_valid_phone("(81) 999-8888"));
        assert!(!is_valid_phone("(81) 99999-888"));
    }

    #[test]
    fn profile_form_requires_contact_fields() {
        let identity = Identity {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            ..Default::default()
        };
        let mut form = ProfileForm::from_identity(&identity);
        let errors = form.to_request().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("phone"), Some("Telefone é obrigatório"));

        form.phone = "(81) 99999-8888".to_string();
        form.address = "Rua A, 1".to_string();
        form.city = "Recife".to_string();
        form.state = "PE".to_string();
        let req = form.to_request().unwrap();
        assert_eq!(req.city.as_deref(), Some("Recife"));
        assert_eq!(req.bio, None);
    }

    #[test]
    fn donation_edit_sends_only_changed_fields() {
        let donation = Donation {
            id: 5,
            title: "Mesa de madeira".to_string(),
            description: "Mesa com quatro cadeiras".to_string(),
            quantity: 1,
            ..Default::default()
        };
        let mut form = DonationEditForm::from_donation(&donation);
        assert_eq!(form.to_patch().unwrap(), DonationPatch::default());

        form.title = "  Mesa nova  ".to_string();
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Mesa nova"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.quantity, None);

        form.quantity = "0".to_string();
        form.description = "curta".to_string();
        let errors = form.to_patch().unwrap_err();
        assert_eq!(errors.get("quantity"), Some("Quantidade deve ser pelo menos 1"));
        assert_eq!(
            errors.get("description"),
            Some("Descrição deve ter pelo menos 10 caracteres")
        );
    }

    #[test]
    fn password_confirmation_must_match() {
        let form = PasswordForm {
            current: "old".to_string(),
            new: "novasenha".to_string(),
            confirm: "outra".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().get("confirmPassword"),
            Some("As senhas não coincidem")
        );

        let form = PasswordForm {
            confirm: "novasenha".to_string(),
            ..form
        };
        assert!(form.validate().is_ok());
    }
}
