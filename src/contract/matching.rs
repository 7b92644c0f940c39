use crate::contract::{attribute::Attribute, node::Contract};

impl Contract {
    pub fn matches(&self, demand: &Contract, allow_dynamic: bool) -> bool {
        if Some(self.contract_type()) != demand.contract_type().provision_counterpart() {
            return false;
        }
        if demand.contract_type().matches_by_name() && self.name() != demand.name() {
            return false;
        }

        if demand.contract_type().is_feature() {
            return match (demand.attribute(), self.attribute()) {
                (Ok(Some(Attribute::Feature(wanted))), Ok(Some(Attribute::Feature(offered)))) => {
                    if offered.dynamic {
                        allow_dynamic
                    } else {
                        wanted.admits(&offered.value)
                    }
                }
                _ => false,
            };
        }

        demand.children().all(|wanted| {
            let Some(pair) = wanted.contract_type().provision_counterpart() else {
                return false;
            };
            let Ok(mut offers) = self.contracts(pair) else {
                return false;
            };
            offers.any(|offered| offered.matches(wanted, allow_dynamic))
        })
    }
}
