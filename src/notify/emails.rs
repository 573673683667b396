use crate::entities::BankFund;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html_body: String,
}

pub fn subscription_opened(user_name: &str, fund: &BankFund) -> EmailContent {
    EmailContent {
        subject: "Fondo de Inversión Registrado".to_string(),
        html_body: format!(
            "Hola {user_name}, usted se ha registrado al fondo de inversión {} \
             con un monto de {} {}.",
            fund.name, fund.currency, fund.min_amount
        ),
    }
}

pub fn subscription_closed(user_name: &str, fund: &BankFund) -> EmailContent {
    EmailContent {
        subject: "Fondo de Inversión Retirado".to_string(),
        html_body: format!(
            "Hola {user_name}, se ha retirado del fondo de inversión {}, le ha sido \
             retornado el capital invertido por valor de {} {}.",
            fund.name, fund.currency, fund.min_amount
        ),
    }
}

pub fn insufficient_funds(user_name: &str, fund: &BankFund) -> EmailContent {
    EmailContent {
        subject: "Fondo de Inversión Insuficiente".to_string(),
        html_body: format!(
            "Hola {user_name}, usted no cuenta con saldo disponible para subscribirse \
             al fondo de inversión {}. Para ello necesita disponer de un monto mínimo \
             de {} {}.",
            fund.name, fund.currency, fund.min_amount
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn fund() -> BankFund {
        BankFund::new(
            "FPV_BTG_PACTUAL_RECAUDADORA".to_string(),
            "cat-1".to_string(),
            Decimal::from(75_000),
            Some("COP"),
            "admin-1",
        )
    }

    #[test]
    fn test_bodies_name_the_fund_and_amount() {
        let fund = fund();
        for email in [
            subscription_opened("Daniel", &fund),
            subscription_closed("Daniel", &fund),
            insufficient_funds("Daniel", &fund),
        ] {
            assert!(email.html_body.contains("FPV_BTG_PACTUAL_RECAUDADORA"));
            assert!(email.html_body.contains("COP 75000"));
            assert!(email.html_body.contains("Daniel"));
        }
    }
}
