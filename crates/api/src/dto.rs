//! Wire DTOs and their validated conversions into domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldbill_billing::{
    Currency, LineItem, LineItemKind, Payment, PaymentMethod, SymbolPosition,
};
use fieldbill_core::{DomainError, DomainResult};

/// Wire shape of a work-order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDto {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub item_type: Option<String>,
}

impl TryFrom<LineItemDto> for LineItem {
    type Error = DomainError;

    fn try_from(dto: LineItemDto) -> DomainResult<Self> {
        let kind = match dto.item_type.as_deref() {
            None | Some("material") => LineItemKind::Material,
            Some("service") => LineItemKind::Service,
            Some(other) => {
                // The backend is loosely typed about item kinds; keep the
                // line billable rather than dropping it.
                tracing::debug!(item_type = other, "unrecognized item type, keeping as other");
                LineItemKind::Other
            }
        };

        let item = LineItem {
            description: dto.description,
            quantity: dto.quantity,
            unit_price: dto.unit_price,
            kind,
        };
        // Negative quantity/price never crosses into the domain.
        item.line_total()?;
        Ok(item)
    }
}

/// Wire shape of a recorded payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<PaymentDto> for Payment {
    type Error = DomainError;

    fn try_from(dto: PaymentDto) -> DomainResult<Self> {
        if !(dto.amount > 0.0) {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if dto.payment_method.requires_reference()
            && dto
                .reference_number
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
        {
            return Err(DomainError::validation(
                "a reference number is required for BenefitPay payments",
            ));
        }

        Ok(Payment {
            amount: dto.amount,
            method: dto.payment_method,
            reference_number: dto.reference_number,
            notes: dto.notes,
            recorded_at: dto.recorded_at,
        })
    }
}

/// Wire shape of a display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDto {
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub decimal_places: u32,
    pub is_default: bool,
}

impl TryFrom<CurrencyDto> for Currency {
    type Error = DomainError;

    fn try_from(dto: CurrencyDto) -> DomainResult<Self> {
        if dto.symbol.trim().is_empty() {
            return Err(DomainError::validation("currency symbol must not be empty"));
        }
        Ok(Currency {
            symbol: dto.symbol,
            symbol_position: dto.symbol_position,
            decimal_places: dto.decimal_places,
            is_default: dto.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::decode_envelope;
    use fieldbill_billing::{format_money, materials_subtotal};

    #[test]
    fn decodes_line_items_from_a_wrapped_response() {
        let body = r#"{"data":[
            {"description":"Copper pipe (m)","quantity":2,"unitPrice":10,"itemType":"material"},
            {"description":"Drain flush","quantity":1,"unitPrice":5,"itemType":"service"}
        ]}"#;

        let dtos: Vec<LineItemDto> = decode_envelope(body).unwrap();
        let items: Vec<LineItem> = dtos
            .into_iter()
            .map(LineItem::try_from)
            .collect::<DomainResult<_>>()
            .unwrap();

        assert_eq!(items[0].kind, LineItemKind::Material);
        assert_eq!(items[1].kind, LineItemKind::Service);
        assert_eq!(materials_subtotal(&items).unwrap(), 25.0);
    }

    #[test]
    fn unrecognized_item_type_maps_to_other() {
        let dto = LineItemDto {
            description: "misc".to_string(),
            quantity: 1.0,
            unit_price: 3.0,
            item_type: Some("warranty".to_string()),
        };
        assert_eq!(LineItem::try_from(dto).unwrap().kind, LineItemKind::Other);
    }

    #[test]
    fn negative_wire_quantity_is_rejected() {
        let dto = LineItemDto {
            description: "bad".to_string(),
            quantity: -2.0,
            unit_price: 10.0,
            item_type: None,
        };
        assert!(matches!(
            LineItem::try_from(dto),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn decodes_a_benefit_pay_payment_with_reference() {
        let body = r#"{"data":{
            "amount":50.0,
            "paymentMethod":"BENEFIT_PAY",
            "referenceNumber":"TXN-1234",
            "notes":null,
            "recordedAt":"2026-08-30T10:00:00Z"
        }}"#;

        let dto: PaymentDto = decode_envelope(body).unwrap();
        let payment = Payment::try_from(dto).unwrap();
        assert_eq!(payment.method, PaymentMethod::BenefitPay);
        assert_eq!(payment.reference_number.as_deref(), Some("TXN-1234"));
    }

    #[test]
    fn benefit_pay_without_reference_is_rejected() {
        let dto = PaymentDto {
            amount: 50.0,
            payment_method: PaymentMethod::BenefitPay,
            reference_number: Some("  ".to_string()),
            notes: None,
            recorded_at: Utc::now(),
        };
        assert!(matches!(
            Payment::try_from(dto),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn decodes_a_currency_and_formats_with_it() {
        let body = r#"{"data":{
            "symbol":"BD",
            "symbolPosition":"before",
            "decimalPlaces":3,
            "isDefault":true
        }}"#;

        let dto: CurrencyDto = decode_envelope(body).unwrap();
        let currency = Currency::try_from(dto).unwrap();
        assert_eq!(format_money(82.5, &currency), "BD 82.500");
    }

    #[test]
    fn empty_currency_symbol_is_rejected() {
        let dto = CurrencyDto {
            symbol: "".to_string(),
            symbol_position: SymbolPosition::After,
            decimal_places: 2,
            is_default: false,
        };
        assert!(matches!(
            Currency::try_from(dto),
            Err(DomainError::Validation(_))
        ));
    }
}
